//! Specifier to canonical path resolution.

use crate::plugins::Plugins ;



/// Whether `specifier` is relative to the module that imports it.
pub fn is_relative( specifier: &str ) -> bool {
    matches!( specifier, "." | ".." ) || specifier.starts_with( "./" ) || specifier.starts_with( "../" )
}

/// Resolves a relative `specifier` against the directory of `origin`.
///
/// The last segment of `origin` is dropped and the specifier's segments are appended;
/// `.` segments are skipped and `..` steps out of one directory. Specifiers that are
/// not relative, or have no origin to be relative to, are returned unchanged.
///
/// ```
/// use script_link::resolver::join_relative ;
/// assert_eq!( join_relative( "./b", Some( "a/x" )), "a/b" );
/// assert_eq!( join_relative( "./b", Some( "a/c/x" )), "a/c/b" );
/// assert_eq!( join_relative( "../b", Some( "a/c/x" )), "a/b" );
/// assert_eq!( join_relative( "./b", None ), "./b" );
/// ```
pub fn join_relative( specifier: &str, origin: Option<&str> ) -> String {

    let Some( origin ) = origin.filter(| _ | is_relative( specifier )) else { return specifier.to_string() };

    let mut segments = origin.split( '/' ).collect::<Vec<_>>();
    segments.pop();

    for segment in specifier.split( '/' ) { match segment {
        "." => {},
        ".." => match segments.last().copied() {
            // `/..` stays at the root
            Some( "" ) if segments.len() == 1 => {},
            Some( "." ) => { segments.pop(); segments.push( ".." ); },
            Some( ".." ) | None => segments.push( ".." ),
            Some( _ ) => { segments.pop(); },
        },
        segment => segments.push( segment ),
    }}

    segments.join( "/" )

}

/// Turns `specifier`, imported from `origin`, into the canonical path of the module
/// it names: relative resolution first, then every path plugin in registration order.
pub fn resolve( specifier: &str, origin: Option<&str>, plugins: &Plugins ) -> String {
    plugins.transform_path( join_relative( specifier, origin ))
}
