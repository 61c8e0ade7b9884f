//! The table of module records owned by a loader.

use std::collections::HashMap ;

use crate::loader::LoadError ;
use crate::parser::{ Import, ImportBinding, ModuleScript };
use crate::script::Object ;



/// Index of a module record, in registration order.
#[derive( Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash )]
pub struct ModuleId( usize );

impl ModuleId {
    #[inline] pub fn index( self ) -> usize { self.0 }
}

impl std::fmt::Display for ModuleId {
    fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result { write!( f, "#{}", self.0 ) }
}

/// Lifecycle of a module record. States only ever move forward.
#[derive( Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash )]
pub enum ModuleState {
    /// Known by path only; not yet requested.
    New,
    /// Requested from the transport; waiting for its text.
    Fetching,
    /// Parsed; waiting for its dependencies.
    Pending,
    /// Evaluated; its exports are available.
    Initialized,
    /// Will never initialize. The cause is kept in [`Module::error`].
    Failed,
}

/// One import of a module, with its specifier resolved.
#[derive( Debug, Clone, PartialEq, Eq )]
pub struct Dependency {
    /// The specifier as written.
    pub import_path: String,
    /// Canonical path of the imported module.
    pub path: String,
    pub binding: ImportBinding,
}

impl Dependency {
    pub fn new( import: Import, path: String ) -> Self {
        Self { import_path: import.specifier, path, binding: import.binding }
    }
}

/// A module record.
///
/// Named records are keyed by their canonical path. Inline scripts get an anonymous
/// record each; they can't be imported and are never fetched.
#[derive( Debug )]
pub struct Module {
    pub(crate) id: ModuleId,
    pub(crate) path: Option<String>,
    pub(crate) state: ModuleState,
    pub(crate) deps: Option<Vec<Dependency>>,
    pub(crate) script: Option<ModuleScript>,
    pub(crate) exports: Option<Object>,
    pub(crate) error: Option<LoadError>,
    /// Distinct dependencies that aren't initialized yet.
    pub(crate) waiting_on: usize,
}

impl Module {

    fn new( id: ModuleId, path: Option<String> ) -> Self {
        Self {
            id,
            path,
            state: ModuleState::New,
            deps: None,
            script: None,
            exports: None,
            error: None,
            waiting_on: 0,
        }
    }

    #[inline] pub fn id( &self ) -> ModuleId { self.id }
    #[inline] pub fn path( &self ) -> Option<&str> { self.path.as_deref() }
    #[inline] pub fn state( &self ) -> ModuleState { self.state }

    /// Whether other modules can import this one. False for inline scripts.
    #[inline] pub fn is_injectable( &self ) -> bool { self.path.is_some() }

    /// Path for diagnostics.
    pub fn name( &self ) -> &str { self.path.as_deref().unwrap_or( "<inline>" ) }

    /// Resolved dependencies, present from [`ModuleState::Pending`] on.
    pub fn deps( &self ) -> Option<&[Dependency]> { self.deps.as_deref() }

    pub fn script( &self ) -> Option<&ModuleScript> { self.script.as_ref() }

    /// The export container, present once [`ModuleState::Initialized`].
    pub fn exports( &self ) -> Option<&Object> { self.exports.as_ref() }

    /// Why the module [`ModuleState::Failed`].
    pub fn error( &self ) -> Option<&LoadError> { self.error.as_ref() }

    /// Number of distinct dependencies this module still waits for.
    pub fn waiting_on( &self ) -> usize { self.waiting_on }

}

#[derive( Debug, Default )]
pub(crate) struct Registry {
    modules: Vec<Module>,
    by_path: HashMap<String, ModuleId>,
}

impl Registry {

    #[inline] pub fn id_of( &self, path: &str ) -> Option<ModuleId> { self.by_path.get( path ).copied() }

    #[inline] pub fn module( &self, id: ModuleId ) -> Option<&Module> { self.modules.get( id.0 ) }

    #[inline] pub fn module_mut( &mut self, id: ModuleId ) -> Option<&mut Module> { self.modules.get_mut( id.0 ) }

    pub fn get( &self, path: &str ) -> Option<&Module> { self.id_of( path ).and_then(| id | self.module( id )) }

    /// Returns the record for `path`, creating a [`ModuleState::New`] one if needed.
    pub fn insert_named( &mut self, path: &str ) -> &mut Module {
        let id = match self.id_of( path ) {
            Some( id ) => id,
            None => {
                let id = ModuleId( self.modules.len() );
                self.modules.push( Module::new( id, Some( path.to_string() )));
                self.by_path.insert( path.to_string(), id );
                id
            },
        };
        &mut self.modules[id.0]
    }

    pub fn insert_anonymous( &mut self ) -> &mut Module {
        let id = ModuleId( self.modules.len() );
        self.modules.push( Module::new( id, None ));
        &mut self.modules[id.0]
    }

    pub fn iter( &self ) -> std::slice::Iter<'_, Module> { self.modules.iter() }

    pub fn len( &self ) -> usize { self.modules.len() }

}
