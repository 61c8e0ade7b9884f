use script_link::Plugins ;
use script_link::resolver::{ is_relative, join_relative, resolve };

#[test]
fn resolution_relative_specifiers() {
	assert!( is_relative( "./a" ));
	assert!( is_relative( "../a" ));
	assert!( is_relative( "." ));
	assert!( is_relative( ".." ));
	assert!( !is_relative( "a/b" ));
	assert!( !is_relative( ".hidden" ));
	assert!( !is_relative( "/rooted" ));
}

#[test]
fn resolution_joins_against_origin_directory() {
	assert_eq!( join_relative( "./b", Some( "a/x" )), "a/b" );
	assert_eq!( join_relative( "./c/./d", Some( "a/x" )), "a/c/d" );
	assert_eq!( join_relative( "../../b", Some( "a/c/d/x" )), "a/b" );
	assert_eq!( join_relative( ".", Some( "a/x" )), "a" );
}

#[test]
fn resolution_origin_without_directory() {
	assert_eq!( join_relative( "./b", Some( "x" )), "b" );
	assert_eq!( join_relative( "../b", Some( "x" )), "../b" );
	assert_eq!( join_relative( "../b", Some( "./x" )), "../b" );
}

#[test]
fn resolution_rooted_origin_stays_rooted() {
	assert_eq!( join_relative( "./b", Some( "/app/x" )), "/app/b" );
	assert_eq!( join_relative( "../../../b", Some( "/app/x" )), "/b" );
}

#[test]
fn resolution_bare_specifiers_are_unchanged() {
	let plugins = Plugins::new();
	assert_eq!( resolve( "lib/util", Some( "app/deep/main" ), &plugins ), "lib/util" );
	assert_eq!( resolve( "./util", None, &plugins ), "./util" );
}
