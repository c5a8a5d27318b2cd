use std::future::Future;
use std::pin::Pin;

use crate::error::PointsError;

/// The unit the consume loop drives: one raw record in, side effects
/// done (or a typed failure) out.
///
/// The loop commits a record's offset only after `handle` returns Ok.
/// Uncommitted records are redelivered after a restart, so handlers must
/// tolerate being invoked more than once for the same message.
pub trait RecordHandler: Send + Sync {
    fn handle<'a>(
        &'a self,
        key: Option<&'a [u8]>,
        value: Option<&'a [u8]>,
    ) -> Pin<Box<dyn Future<Output = Result<(), PointsError>> + Send + 'a>>;
}
