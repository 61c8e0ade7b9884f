use script_link::{ Loader, LoadError, ModuleState };
use script_link::script::{ ExecError, RuntimeError };

#[test]
fn load_error_body_throws_while_running() {

	let mut loader = Loader::new();
	loader.request( "faulty" ).expect( "Failed to request" );
	let root = loader.register_script( r#"import { v } from "faulty";"# ).expect( "Failed to register root" );

	loader.complete_fetch( "faulty", Ok( "export const v = nothing.here;".to_string() ))
		.expect( "Failed to complete fetch" );

	let faulty = loader.module( "faulty" ).expect( "Module not registered" );
	assert_eq!( faulty.state(), ModuleState::Failed );
	assert!( faulty.exports().is_none() );

	// The rewritten text starts with a provenance line
	let expected = RuntimeError { line: 2, error: ExecError::UnboundIdentifier( "nothing".to_string() )};
	assert!( matches!( faulty.error(), Some( LoadError::Execution( error )) if *error == expected ));

	assert_eq!( loader.module_by_id( root ).map(| module | module.state() ), Some( ModuleState::Failed ));

}

#[test]
fn load_error_calling_a_non_function() {

	let mut loader = Loader::new();
	loader.define_source( Some( "caller" ), "export const x = 1;\nx();" ).expect( "Failed to define" );

	let caller = loader.module( "caller" ).expect( "Module not registered" );
	assert!( matches!(
		caller.error(),
		Some( LoadError::Execution( RuntimeError { line: 3, error: ExecError::NotCallable( "number" )}))
	));

}
