//! The fetch boundary.
//!
//! The loader never performs I/O itself. Requesting a module queues a
//! [`FetchRequest`]; the host drains the queue with [`Loader::take_requests`],
//! fetches the targets however it likes, in any order, and reports each response
//! through [`Loader::complete_fetch`]. [`Loader::run`] does this synchronously
//! with any [`Transport`].
//!
//! [`Loader::take_requests`]: crate::Loader::take_requests
//! [`Loader::complete_fetch`]: crate::Loader::complete_fetch
//! [`Loader::run`]: crate::Loader::run

use std::collections::HashMap ;
use std::hash::BuildHasher ;
use std::path::PathBuf ;
use thiserror::Error ;



/// A module waiting for its source text.
#[derive( Debug, Clone, PartialEq, Eq, Hash )]
pub struct FetchRequest {
    path: String,
    target: String,
}

impl FetchRequest {

    pub(crate) fn new( path: String, target: String ) -> Self { Self { path, target }}

    /// Canonical path of the requested module; pass it back to `complete_fetch`.
    #[inline] pub fn path( &self ) -> &str { &self.path }

    /// What to fetch: the path with the loader's extension appended.
    #[inline] pub fn target( &self ) -> &str { &self.target }

}

/// Failure to obtain a module's source text.
#[derive( Debug, Error )]
pub enum TransportError {
    #[error( "Not found: {0}" )] NotFound( String ),
    #[error( "Failed to read {target}: {source}" )]
    Io { target: String, #[source] source: std::io::Error },
    #[error( "Request rejected: {0}" )] Rejected( String ),
}

/// Something that can turn a fetch target into source text.
pub trait Transport {
    /// # Errors
    /// Returns a [`TransportError`] if the text can't be obtained.
    fn fetch( &mut self, target: &str ) -> Result<String, TransportError>;
}

impl<S: BuildHasher> Transport for HashMap<String, String, S> {
    fn fetch( &mut self, target: &str ) -> Result<String, TransportError> {
        self.get( target ).cloned().ok_or_else(|| TransportError::NotFound( target.to_string() ))
    }
}

/// Reads fetch targets as files below a root directory.
#[derive( Debug, Clone )]
pub struct DirectoryTransport {
    root: PathBuf,
}

impl DirectoryTransport {

    pub fn new( root: impl Into<PathBuf> ) -> Self { Self { root: root.into() }}

    #[inline] pub fn root( &self ) -> &std::path::Path { &self.root }

}

impl Transport for DirectoryTransport {
    fn fetch( &mut self, target: &str ) -> Result<String, TransportError> {
        let relative = target.trim_start_matches( "./" ).trim_start_matches( '/' );
        std::fs::read_to_string( self.root.join( relative )).map_err(| source | match source.kind() {
            std::io::ErrorKind::NotFound => TransportError::NotFound( target.to_string() ),
            _ => TransportError::Io { target: target.to_string(), source },
        })
    }
}
