#[macro_export]
macro_rules! fixtures {
	{ const ROOT = $root:literal ; } => ( mod fixtures {

		pub const ROOT: &'static str = $root ;

		pub static DIR: once_cell::sync::Lazy<std::path::PathBuf> = once_cell::sync::Lazy::new(||
			std::path::PathBuf::from( $crate::fixture_loading::strip_rs( file!() ))
		);

		pub fn transport() -> script_link::DirectoryTransport {
			script_link::DirectoryTransport::new( DIR.as_path() )
		}

	});
}

#[allow( dead_code )]
mod fixture_loading {

	use std::cell::RefCell ;
	use std::rc::Rc ;
	use script_link::{ Plugins, Value };

	pub const fn strip_rs( path: &'static str ) -> &'static str {
		match path.as_bytes() {
			[rest @ .., b'.', b'r', b's'] => {
				// SAFETY: we just checked that the last three bytes are ".rs",
				// so the split is at a UTF-8 boundary.
				unsafe { core::str::from_utf8_unchecked( rest ) }
			}
			_ => unreachable!(),
		}
	}

	/// Calls to `trace( .. )` made by module bodies, in call order.
	pub type Trace = Rc<RefCell<Vec<String>>>;

	/// Plugins whose deps plugin binds a `trace` function into every module scope.
	pub fn trace_plugins() -> ( Plugins, Trace ) {
		let trace = Trace::default();
		let log = Rc::clone( &trace );
		let plugins = Plugins::new().with_deps_plugin( move | _api, _path, bindings | {
			let log = Rc::clone( &log );
			bindings.insert( "trace", Value::native( move | args | {
				let entry = args.iter()
					.map(| arg | arg.as_str().map_or_else(|| format!( "{:?}", arg ), str::to_string ))
					.collect::<Vec<_>>()
					.join( " " );
				log.borrow_mut().push( entry );
				Ok( Value::Undefined )
			}));
		});
		( plugins, trace )
	}

	pub fn traced( trace: &Trace ) -> Vec<String> { trace.borrow().clone() }

}
