//! The module loader and its scheduler.
//!
//! Every module moves through `New → Fetching → Pending → Initialized`, or ends in
//! `Failed`. A module entering `Pending` counts its distinct dependencies that are
//! not initialized yet and requests the ones the loader has never seen. When the
//! count drops to zero the module joins the ready queue. The queue is ordered by
//! [`ModuleId`], so modules that become ready together run in registration order.
//! Initializing a module decrements the count of every module waiting on it.
//!
//! Failure is terminal and spreads: a module whose text can't be fetched, parsed or
//! executed fails, and so does every module that waits on it, transitively. Modules
//! caught in an import cycle are never ready and stay `Pending`; see
//! [`Loader::stalled`].

use std::collections::{ BTreeSet, HashMap, VecDeque };
use itertools::Itertools ;
use pipe_trait::Pipe ;
use thiserror::Error ;

use crate::discovery ;
use crate::evaluator ;
use crate::parser::{ parse, ParseError, ParseWarning, ParsedModule };
use crate::plugins::Plugins ;
use crate::registry::{ Dependency, Module, ModuleId, ModuleState, Registry };
use crate::resolver ;
use crate::script::{ Object, RuntimeError };
use crate::transport::{ FetchRequest, Transport, TransportError };
use crate::utils::PartialSuccess ;



/// Extension appended to fetch targets unless configured otherwise.
pub const DEFAULT_EXTENSION: &str = "js" ;

/// Misuse of the loader protocol. Nothing changes when one of these is returned.
#[derive( Debug, Error, Clone, PartialEq )]
pub enum RequestError {
    #[error( "Cannot load module without path" )] MissingPath,
    #[error( "Module already requested: {0}" )] AlreadyRequested( String ),
    /// The module already has a body; it runs at most once.
    #[error( "Module already defined: {0}" )] AlreadyDefined( String ),
    #[error( "Module is not being fetched: {0}" )] NotFetching( String ),
    #[error( "{0}" )] Parse( #[from] ParseError ),
}

/// Why a module failed. Kept on the module record.
#[derive( Debug, Error )]
pub enum LoadError {
    #[error( "Failed to fetch {target}: {source}" )]
    Transport { target: String, #[source] source: TransportError },
    #[error( "Failed to parse: {0}" )] Parse( #[from] ParseError ),
    #[error( "Execution failed: {0}" )] Execution( #[from] RuntimeError ),
    #[error( "Dependency {0} failed" )] DependencyFailed( String ),
    #[error( "{0}" )] Request( #[from] RequestError ),
}

/// Problems that don't stop a module from loading.
#[derive( Debug, Error, Clone, PartialEq )]
pub enum LoadWarning {
    #[error( "{module}: {warning}" )] Parse { module: String, warning: ParseWarning },
    #[error( "Module has no exports: {0}" )] MissingExports( String ),
    #[error( "Module exported a non-object value, kept as `default`: {0}" )] NonObjectExports( String ),
}

/// Loads modules by path or by content and initializes each once its
/// dependencies are.
///
/// ```
/// use std::collections::HashMap ;
/// use script_link::{ Loader, ModuleState, Value };
///
/// let mut sources = HashMap::from([
/// 	( "lib/math.js".to_string(), "export const answer = 42;".to_string() ),
/// ]);
///
/// let mut loader = Loader::new();
/// loader.register_script( r#"import { answer } from "lib/math"; export const copy = answer;"# )?;
/// loader.run( &mut sources );
///
/// assert_eq!( loader.module( "lib/math" ).map(| module | module.state() ), Some( ModuleState::Initialized ));
/// assert_eq!( loader.exports( "lib/math" ).map(| exports | exports.get( "answer" )), Some( Value::Number( 42.0 )));
/// # Ok::<(), script_link::RequestError>(())
/// ```
#[derive( Debug )]
pub struct Loader {
    registry: Registry,
    plugins: Plugins,
    extension: String,
    requests: VecDeque<FetchRequest>,
    dependents: HashMap<String, Vec<ModuleId>>,
    ready: BTreeSet<ModuleId>,
    warnings: Vec<LoadWarning>,
}

impl Default for Loader {
    fn default() -> Self {
        Self {
            registry: Registry::default(),
            plugins: Plugins::default(),
            extension: DEFAULT_EXTENSION.to_string(),
            requests: VecDeque::new(),
            dependents: HashMap::new(),
            ready: BTreeSet::new(),
            warnings: Vec::new(),
        }
    }
}

impl Loader {

    pub fn new() -> Self { Self::default() }

    /// Replaces the loader's plugin lists.
    pub fn with_plugins( mut self, plugins: Plugins ) -> Self {
        self.plugins = plugins ;
        self
    }

    /// Sets the extension appended to fetch targets. A leading `.` is ignored and an
    /// empty extension leaves paths untouched.
    pub fn with_extension( mut self, extension: impl Into<String> ) -> Self {
        self.extension = extension.into().trim_start_matches( '.' ).to_string();
        self
    }

    #[inline] pub fn extension( &self ) -> &str { &self.extension }

    #[inline] pub fn plugins( &self ) -> &Plugins { &self.plugins }

    /// Registers an inline script as an anonymous root.
    ///
    /// # Errors
    /// Returns [`RequestError::Parse`] if the script can't be parsed; nothing is registered then.
    pub fn register_script( &mut self, source: &str ) -> Result<ModuleId, RequestError> {
        let ( parsed, warnings ) = parse( source, None )?;
        let id = self.registry.insert_anonymous().id ;
        self.record_parse_warnings( "<inline>", warnings );
        self.enter_pending( id, parsed );
        self.drain_ready();
        Ok( id )
    }

    /// Registers every inline `<script type="module">` of `html` as an anonymous root.
    /// Scripts that fail to parse are skipped and reported next to the registered ids.
    pub fn register_document( &mut self, html: &str ) -> PartialSuccess<Vec<ModuleId>, RequestError> {
        discovery::module_scripts( html )
            .into_iter()
            .map(| script | self.register_script( script ))
            .partition_result()
    }

    /// Registers a module by reference and queues a request for its text.
    ///
    /// # Errors
    /// - [`RequestError::MissingPath`] if `path` is empty.
    /// - [`RequestError::AlreadyRequested`] if the module is past [`ModuleState::New`].
    pub fn request( &mut self, path: &str ) -> Result<ModuleId, RequestError> {

        if path.is_empty() { return Err( RequestError::MissingPath ) }

        let module = self.registry.insert_named( path );
        if module.state != ModuleState::New { return Err( RequestError::AlreadyRequested( path.to_string() )) }
        module.state = ModuleState::Fetching ;
        let id = module.id ;

        let target = fetch_target( path, &self.extension );
        tracing::debug!( path, target = %target, "Requesting module" );
        self.requests.push_back( FetchRequest::new( path.to_string(), target ));

        Ok( id )

    }

    /// Registers a module by content. Imports are resolved against `path`; `None`
    /// defines an anonymous root.
    ///
    /// # Errors
    /// - [`RequestError::MissingPath`] if `path` is empty.
    /// - [`RequestError::AlreadyDefined`] if the module already has a body.
    pub fn define( &mut self, path: Option<&str>, parsed: ParsedModule ) -> Result<ModuleId, RequestError> {

        let module = match path {
            Some( "" ) => return Err( RequestError::MissingPath ),
            Some( path ) => self.registry.insert_named( path ),
            None => self.registry.insert_anonymous(),
        };
        if !matches!( module.state, ModuleState::New | ModuleState::Fetching ) {
            return Err( RequestError::AlreadyDefined( module.name().to_string() ));
        }
        let id = module.id ;

        // A queued request for this module is now moot
        if let Some( path ) = path { self.requests.retain(| request | request.path() != path ) }

        self.enter_pending( id, parsed );
        self.drain_ready();
        Ok( id )

    }

    /// Parses `source` with `path` as its origin and registers it by content.
    ///
    /// # Errors
    /// See [`Loader::define`]. Parse failures are returned as [`RequestError::Parse`].
    pub fn define_source( &mut self, path: Option<&str>, source: &str ) -> Result<ModuleId, RequestError> {
        if let Some( module ) = path.and_then(| path | self.registry.get( path )) {
            if !matches!( module.state, ModuleState::New | ModuleState::Fetching ) {
                return Err( RequestError::AlreadyDefined( module.name().to_string() ));
            }
        }
        let ( parsed, warnings ) = parse( source, path )?;
        self.record_parse_warnings( path.unwrap_or( "<inline>" ), warnings );
        self.define( path, parsed )
    }

    /// Reports the response to a [`FetchRequest`].
    ///
    /// Text is parsed with `path` as origin and registered by content. A transport
    /// or parse error fails the module and everything waiting on it.
    ///
    /// # Errors
    /// [`RequestError::NotFetching`] if `path` isn't waiting for a response.
    pub fn complete_fetch(
        &mut self,
        path: &str,
        response: Result<String, TransportError>,
    ) -> Result<ModuleId, RequestError> {

        let id = self.registry.id_of( path )
            .filter(| id | self.registry.module( *id ).is_some_and(| module | module.state == ModuleState::Fetching ))
            .ok_or_else(|| RequestError::NotFetching( path.to_string() ))?;

        response
            .map_err(| source | LoadError::Transport { target: fetch_target( path, &self.extension ), source })
            .and_then(| text | parse( &text, Some( path )).map_err( LoadError::from ))
            .pipe(| outcome | match outcome {
                Ok(( parsed, warnings )) => {
                    self.record_parse_warnings( path, warnings );
                    self.enter_pending( id, parsed );
                },
                Err( error ) => self.fail( id, error ),
            });

        self.drain_ready();
        Ok( id )

    }

    /// Takes every queued request, oldest first.
    pub fn take_requests( &mut self ) -> Vec<FetchRequest> { self.requests.drain( .. ).collect() }

    #[inline] pub fn has_requests( &self ) -> bool { !self.requests.is_empty() }

    /// Fetches queued requests through `transport`, in queue order, until none remain.
    pub fn run<T: Transport + ?Sized>( &mut self, transport: &mut T ) {
        while let Some( request ) = self.requests.pop_front() {
            let response = transport.fetch( request.target() );
            if let Err( error ) = self.complete_fetch( request.path(), response ) {
                tracing::warn!( path = request.path(), %error, "Dropped fetch response" );
            }
        }
    }

    /// Canonical path of `specifier` imported from `origin`.
    pub fn resolve( &self, specifier: &str, origin: Option<&str> ) -> String {
        resolver::resolve( specifier, origin, &self.plugins )
    }

    #[inline] pub fn module( &self, path: &str ) -> Option<&Module> { self.registry.get( path ) }

    #[inline] pub fn module_by_id( &self, id: ModuleId ) -> Option<&Module> { self.registry.module( id ) }

    /// All module records in registration order.
    pub fn modules( &self ) -> impl Iterator<Item = &Module> { self.registry.iter() }

    #[inline] pub fn module_count( &self ) -> usize { self.registry.len() }

    pub fn state( &self, path: &str ) -> Option<ModuleState> { self.module( path ).map( Module::state ) }

    /// Exports of an initialized module.
    pub fn exports( &self, path: &str ) -> Option<&Object> { self.module( path ).and_then( Module::exports ) }

    /// Modules still fetching or waiting on dependencies.
    pub fn stalled( &self ) -> Vec<&Module> {
        self.registry.iter()
            .filter(| module | matches!( module.state, ModuleState::Fetching | ModuleState::Pending ))
            .collect()
    }

    /// Warnings collected so far.
    #[inline] pub fn warnings( &self ) -> &[LoadWarning] { &self.warnings }

    pub fn take_warnings( &mut self ) -> Vec<LoadWarning> { std::mem::take( &mut self.warnings ) }

    fn warn( &mut self, warning: LoadWarning ) {
        tracing::warn!( %warning, "Module warning" );
        self.warnings.push( warning );
    }

    fn record_parse_warnings( &mut self, module: &str, warnings: Vec<ParseWarning> ) {
        warnings.into_iter()
            .map(| warning | LoadWarning::Parse { module: module.to_string(), warning })
            .for_each(| warning | self.warn( warning ));
    }

    fn enter_pending( &mut self, id: ModuleId, parsed: ParsedModule ) {

        let Some( module ) = self.registry.module( id ) else { return };
        let origin = module.path.clone();

        let ParsedModule { imports, script, .. } = parsed ;
        let deps = imports.into_iter()
            .map(| import | {
                let path = resolver::resolve( &import.specifier, origin.as_deref(), &self.plugins );
                Dependency::new( import, path )
            })
            .collect::<Vec<_>>();
        let unique = deps.iter().map(| dep | dep.path.clone() ).unique().collect::<Vec<_>>();

        let Some( module ) = self.registry.module_mut( id ) else { return };
        module.deps = Some( deps );
        module.script = Some( script );
        module.state = ModuleState::Pending ;
        tracing::debug!( module = %module.name(), deps = unique.len(), "Module pending" );

        let mut waiting_on = 0 ;
        for path in unique {
            match self.registry.get( &path ).map( Module::state ) {
                Some( ModuleState::Initialized ) => continue,
                Some( ModuleState::Failed ) => return self.fail( id, LoadError::DependencyFailed( path )),
                Some( _ ) => {},
                None => if let Err( error ) = self.request( &path ) {
                    return self.fail( id, LoadError::Request( error ));
                },
            }
            self.dependents.entry( path ).or_default().push( id );
            waiting_on += 1 ;
        }

        if let Some( module ) = self.registry.module_mut( id ) { module.waiting_on = waiting_on }
        if waiting_on == 0 { self.ready.insert( id ); }

    }

    fn drain_ready( &mut self ) {
        while let Some( id ) = self.ready.pop_first() { self.initialize( id ) }
    }

    fn initialize( &mut self, id: ModuleId ) {

        let Some( module ) = self.registry.module( id ) else { return };
        if module.state != ModuleState::Pending { return }

        let outcome = evaluator::evaluate( module, &self.registry, &self.plugins );
        let ( exports, warnings ) = match outcome {
            Ok( evaluated ) => evaluated,
            Err( error ) => return self.fail( id, LoadError::Execution( error )),
        };
        warnings.into_iter().for_each(| warning | self.warn( warning ));

        let Some( module ) = self.registry.module_mut( id ) else { return };
        module.exports = Some( exports );
        module.state = ModuleState::Initialized ;
        tracing::debug!( module = %module.name(), "Module initialized" );

        let Some( path ) = module.path.clone() else { return };
        for dependent in self.dependents.remove( &path ).unwrap_or_default() {
            let Some( module ) = self.registry.module_mut( dependent ) else { continue };
            if module.state != ModuleState::Pending { continue }
            module.waiting_on = module.waiting_on.saturating_sub( 1 );
            if module.waiting_on == 0 { self.ready.insert( dependent ); }
        }

    }

    /// Fails `id` and, transitively, every module waiting on it.
    fn fail( &mut self, id: ModuleId, error: LoadError ) {
        let mut worklist = vec![( id, error )];
        while let Some(( id, error )) = worklist.pop() {

            let Some( module ) = self.registry.module_mut( id ) else { continue };
            if matches!( module.state, ModuleState::Initialized | ModuleState::Failed ) { continue }

            tracing::warn!( module = %module.name(), %error, "Module failed" );
            module.state = ModuleState::Failed ;
            module.error = Some( error );
            self.ready.remove( &id );

            let Some( path ) = module.path.clone() else { continue };
            let dependents = self.dependents.remove( &path ).unwrap_or_default();
            worklist.extend( dependents.into_iter().map(| dependent | ( dependent, LoadError::DependencyFailed( path.clone() ))));

        }
    }

}

/// `path` with `.extension` appended, unless its last segment already has it.
fn fetch_target( path: &str, extension: &str ) -> String {
    let file = path.rsplit( '/' ).next().unwrap_or( path );
    let has_extension = extension.is_empty() || file
        .strip_suffix( extension )
        .is_some_and(| stem | stem.ends_with( '.' ));
    match has_extension {
        true => path.to_string(),
        false => format!( "{}.{}", path, extension ),
    }
}
