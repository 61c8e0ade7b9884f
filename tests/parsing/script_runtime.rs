use std::cell::Cell ;
use std::rc::Rc ;
use script_link::script::{ Bindings, CompileError, CompiledUnit, ExecError, Object, RuntimeError, Value };

fn compile( source: &str ) -> CompiledUnit {
	CompiledUnit::compile( source ).expect( "Failed to compile" )
}

#[test]
fn script_runtime_member_paths_and_literals() {

	let unit = compile( r#"
		const config = { name: "demo", "quoted key": true, nested: { list: [ 1, -2, null ] }};
		target.name = config.name ;
		target["size"] = config.nested.list.length ;
		target.second = config.nested.list[1];
		target.flag = config["quoted key"];
	"# );

	let target = Object::new();
	unit.invoke( &[ "target".to_string() ], vec![ Value::Object( target.clone() )]).expect( "Failed to run" );

	assert_eq!( target.get( "name" ), Value::from( "demo" ));
	assert_eq!( target.get( "size" ), Value::Number( 3.0 ));
	assert_eq!( target.get( "second" ), Value::Number( -2.0 ));
	assert_eq!( target.get( "flag" ), Value::Bool( true ));

}

#[test]
fn script_runtime_missing_arguments_are_undefined() {

	let unit = compile( "out.seen = missing ;" );
	let out = Object::new();
	unit.invoke( &[ "out".to_string(), "missing".to_string() ], vec![ Value::Object( out.clone() )]).expect( "Failed to run" );

	assert!( out.contains( "seen" ));
	assert_eq!( out.get( "seen" ), Value::Undefined );

}

#[test]
fn script_runtime_units_can_run_repeatedly() {

	let calls = Rc::new( Cell::new( 0 ));
	let counter = Rc::clone( &calls );
	let tick = Value::native( move | _args | {
		counter.set( counter.get() + 1 );
		Ok( Value::Number( f64::from( counter.get() )))
	});

	let unit = compile( "const first = tick();\nconst second = tick();" );
	for _ in 0..2 {
		let mut bindings = Bindings::new();
		bindings.insert( "tick", tick.clone() );
		unit.call( bindings ).expect( "Failed to run" );
	}
	assert_eq!( calls.get(), 4 );
	assert_eq!( unit.statement_count(), 2 );

}

#[test]
fn script_runtime_native_errors_carry_the_line() {

	let fail = Value::native(| _args | Err( ExecError::Native( "refused".to_string() )));
	let unit = compile( "const a = 1;\n\nfail( a );" );

	let mut bindings = Bindings::new();
	bindings.insert( "fail", fail );
	assert_eq!(
		unit.call( bindings ),
		Err( RuntimeError { line: 3, error: ExecError::Native( "refused".to_string() )}),
	);

}

#[test]
fn script_runtime_execution_errors() {

	let run = | source: &str | compile( source ).invoke( &[], Vec::new() ).map_err(| error | error.error );

	assert_eq!( run( "let a ;\na.b = 1;" ), Err( ExecError::NotAnObject { key: "b".to_string(), target: "undefined" }));
	assert_eq!( run( "const a = null.b ;" ), Err( ExecError::PropertyOfNothing { key: "b".to_string(), target: "null" }));
	assert_eq!( run( "const a = -\"text\";" ), Err( ExecError::NotANumber( "string" )));
	assert_eq!( run( "const a = {};\nconst b = a[{}];" ), Err( ExecError::InvalidPropertyKey( "object" )));
	assert_eq!( run( "undeclared = 1;" ), Err( ExecError::UnboundIdentifier( "undeclared".to_string() )));

}

#[test]
fn script_runtime_rejects_unsupported_syntax() {

	assert!( matches!(
		CompiledUnit::compile( "const a = new Thing();" ),
		Err( CompileError::Unsupported { keyword, line: 1 }) if keyword == "new"
	));
	assert!( matches!(
		CompiledUnit::compile( "\nreturn 1;" ),
		Err( CompileError::Unsupported { keyword, line: 2 }) if keyword == "return"
	));
	assert!( matches!( CompiledUnit::compile( "1 = 2;" ), Err( CompileError::InvalidAssignmentTarget( 1 ))));
	assert!( matches!( CompiledUnit::compile( "const a = ;" ), Err( CompileError::UnexpectedToken { line: 1, .. })));

}

#[test]
fn script_runtime_limits_expression_nesting() {

	let brackets = format!( "const a = {};", "[".repeat( 100_000 ));
	assert!( matches!( CompiledUnit::compile( &brackets ), Err( CompileError::NestingTooDeep( 1 ))));

	let negations = format!( "\nconst a = {}1;", "-".repeat( 100_000 ));
	assert!( matches!( CompiledUnit::compile( &negations ), Err( CompileError::NestingTooDeep( 2 ))));

	let chain = format!( "const a = b{};", ".c".repeat( 100_000 ));
	assert!( matches!( CompiledUnit::compile( &chain ), Err( CompileError::NestingTooDeep( 1 ))));

	let reasonable = format!( "const a = {}1{};", "[ ".repeat( 32 ), " ]".repeat( 32 ));
	assert_eq!( compile( &reasonable ).statement_count(), 1 );

}
