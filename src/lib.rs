//! A runtime module loader for script units that use `import`/`export` syntax.
//!
//! Each unit arrives as source text. `script_link` recognizes its imports and
//! exports, resolves the imported specifiers to canonical paths, requests the
//! units it hasn't seen yet and runs every unit exactly once, after all of its
//! dependencies have run, with their exports bound into its scope.
//!
//! # Core Concepts
//!
//! - [`Loader`]: Owns the module table and the scheduler. Units are registered by
//! 	content ([`Loader::register_script`], [`Loader::define`]) or by reference
//! 	([`Loader::request`]); the latter queues a [`FetchRequest`].
//!
//! - [`Module`]: One record per canonical path, or one per inline script. Its
//! 	[`ModuleState`] only moves forward:
//! 	`New → Fetching → Pending → Initialized`, or `Failed`.
//!
//! - [`Transport`]: Turns fetch targets into text. The loader performs no I/O;
//! 	hosts either drive requests themselves with [`Loader::take_requests`] and
//! 	[`Loader::complete_fetch`], or hand a transport to [`Loader::run`].
//!
//! - [`Plugins`]: Two ordered extension lists given to a loader at construction.
//! 	Path plugins rewrite canonical paths; deps plugins add bindings to a unit's
//! 	scope right before it runs.
//!
//! - [`script`]: The runtime unit bodies execute in. Bodies are compiled when they
//! 	are parsed, so evaluation never turns text into code.
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap ;
//! use script_link::{ Loader, ModuleState, Value };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut sources = HashMap::from([
//! 	( "app/greeting.js".to_string(), r#"
//! 		import { name } from "./name";
//! 		export const greeting = { to: name };
//! 	"#.to_string() ),
//! 	( "app/name.js".to_string(), r#"export const name = "world";"#.to_string() ),
//! ]);
//!
//! let mut loader = Loader::new();
//! loader.request( "app/greeting" )?;
//!
//! // Nothing happens until the requested text arrives.
//! assert_eq!( loader.state( "app/greeting" ), Some( ModuleState::Fetching ));
//! loader.run( &mut sources );
//!
//! let greeting = loader.exports( "app/greeting" ).ok_or( "not loaded" )?.get( "greeting" );
//! let to = greeting.property( "to" )?;
//! assert_eq!( to, Value::from( "world" ));
//! # Ok(())
//! # }
//! ```
//!
//! # Failure
//!
//! A unit whose text can't be fetched, parsed or executed becomes
//! [`ModuleState::Failed`], and so does every unit that waits on it. The cause is
//! kept in [`Module::error`]. Import cycles are not detected: the units involved
//! stay `Pending` and show up in [`Loader::stalled`].
//!
//! # Inline Documents
//!
//! [`Loader::register_document`] registers the body of every inline
//! `<script type="module">` of an HTML document as an anonymous root.

mod token ;
mod registry ;
mod loader ;
mod evaluator ;
mod utils ;
pub mod script ;
pub mod parser ;
pub mod resolver ;
pub mod plugins ;
pub mod transport ;
pub mod discovery ;

pub use loader::{ Loader, LoadError, LoadWarning, RequestError, DEFAULT_EXTENSION };
pub use registry::{ Module, ModuleId, ModuleState, Dependency };
pub use plugins::{ Plugins, LoaderApi };
pub use transport::{ Transport, FetchRequest, TransportError, DirectoryTransport };
pub use parser::{ ParsedModule, ParseError, ParseWarning, ImportBinding };
pub use script::{ Value, Object, Bindings };
pub use token::LexError ;
pub use utils::PartialSuccess ;
