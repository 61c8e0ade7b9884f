//! Results that carry non-fatal findings alongside the value.

/// A successful outcome plus the warnings raised on the way to it. Warnings never
/// prevent the value from being produced; callers decide whether to surface them.
pub type PartialSuccess<T, W> = ( T, Vec<W> );
