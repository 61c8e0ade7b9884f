//! Loader extension points.
//!
//! Two ordered lists, both owned by the loader they were given to:
//!
//! - **path plugins** rewrite every canonical path after relative resolution, e.g. to
//! 	map bare specifiers onto a vendor directory.
//! - **deps plugins** run right before a module body executes and may add or replace
//! 	bindings in its scope, e.g. to provide host functions.
//!
//! ```
//! use script_link::{ Loader, Plugins, Value };
//!
//! let plugins = Plugins::new()
//! 	.with_path_plugin(| path | match path.strip_prefix( "@lib/" ) {
//! 		Some( rest ) => format!( "vendor/{}", rest ),
//! 		None => path.to_string(),
//! 	})
//! 	.with_deps_plugin(| _api, _path, bindings | {
//! 		bindings.insert( "answer", Value::Number( 42.0 ));
//! 	});
//!
//! let loader = Loader::new().with_plugins( plugins );
//! assert_eq!( loader.resolve( "@lib/x", None ), "vendor/x" );
//! ```

use crate::registry::{ Module, Registry };
use crate::resolver ;
use crate::script::{ Bindings, Object };



/// Rewrites a canonical path.
pub type PathPlugin = Box<dyn Fn( &str ) -> String>;

/// Adjusts a module's bindings before its body runs. Receives the loader view, the
/// path of the module about to run (`None` for inline scripts) and its bindings.
pub type DepsPlugin = Box<dyn Fn( &LoaderApi<'_>, Option<&str>, &mut Bindings )>;

/// The extension lists of one loader. Plugins run in the order they were added.
#[derive( Default )]
pub struct Plugins {
    path: Vec<PathPlugin>,
    deps: Vec<DepsPlugin>,
}

impl Plugins {

    pub fn new() -> Self { Self::default() }

    pub fn with_path_plugin( mut self, plugin: impl Fn( &str ) -> String + 'static ) -> Self {
        self.path.push( Box::new( plugin ));
        self
    }

    pub fn with_deps_plugin(
        mut self,
        plugin: impl Fn( &LoaderApi<'_>, Option<&str>, &mut Bindings ) + 'static,
    ) -> Self {
        self.deps.push( Box::new( plugin ));
        self
    }

    pub(crate) fn transform_path( &self, path: String ) -> String {
        self.path.iter().fold( path, | path, plugin | plugin( &path ))
    }

    pub(crate) fn inject( &self, api: &LoaderApi<'_>, path: Option<&str>, bindings: &mut Bindings ) {
        self.deps.iter().for_each(| plugin | plugin( api, path, bindings ));
    }

}

impl std::fmt::Debug for Plugins {
    fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
        f.debug_struct( "Plugins" )
            .field( "path", &self.path.len() )
            .field( "deps", &self.deps.len() )
            .finish()
    }
}

/// Read-only view of the loader handed to deps plugins.
#[derive( Clone, Copy )]
pub struct LoaderApi<'a> {
    registry: &'a Registry,
    plugins: &'a Plugins,
}

impl<'a> LoaderApi<'a> {

    pub(crate) fn new( registry: &'a Registry, plugins: &'a Plugins ) -> Self { Self { registry, plugins }}

    /// Resolves `specifier` as if it was imported from `origin`.
    pub fn resolve( &self, specifier: &str, origin: Option<&str> ) -> String {
        resolver::resolve( specifier, origin, self.plugins )
    }

    pub fn module( &self, path: &str ) -> Option<&'a Module> { self.registry.get( path ) }

    /// Exports of an initialized module.
    pub fn exports( &self, path: &str ) -> Option<&'a Object> { self.module( path ).and_then( Module::exports ) }

}
