//! Inline module discovery in HTML documents.
//!
//! Finds `<script type="module">` elements and returns their bodies so each can be
//! registered as an anonymous root. Tag and attribute names are matched without
//! regard to case and attribute values may be quoted with either quote or not at
//! all. Elements with a `src` attribute are skipped: their body is not the module.

const OPEN_TAG: &str = "<script" ;
const CLOSE_TAG: &str = "</script" ;



/// Bodies of the inline module scripts in `html`, in document order.
///
/// ```
/// use script_link::discovery::module_scripts ;
///
/// let html = r#"
/// 	<script>var classic = 1;</script>
/// 	<SCRIPT Type=module>export const a = 1;</SCRIPT>
/// 	<script type="module" src="x.js"></script>
/// "#;
/// assert_eq!( module_scripts( html ), vec![ "export const a = 1;" ]);
/// ```
pub fn module_scripts( html: &str ) -> Vec<&str> {

    // ASCII lowercasing keeps every byte offset valid in both strings
    let lower = html.to_ascii_lowercase();
    let mut scripts = Vec::new();
    let mut cursor = 0 ;

    while let Some( found ) = lower[cursor..].find( OPEN_TAG ) {

        let name_end = cursor + found + OPEN_TAG.len();
        if !lower[name_end..].starts_with(| c: char | c.is_ascii_whitespace() || c == '>' || c == '/' ) {
            cursor = name_end ;
            continue ;
        }

        let Some( tag_end ) = find_tag_end( &lower, name_end ) else { break };
        let Some( body_len ) = lower[tag_end + 1..].find( CLOSE_TAG ) else { break };
        let body = &html[tag_end + 1..tag_end + 1 + body_len];

        let mut is_module = false ;
        let mut has_src = false ;
        for ( name, value ) in Attributes::new( &html[name_end..tag_end] ) {
            if name.eq_ignore_ascii_case( "type" ) {
                is_module = value.is_some_and(| value | value.trim().eq_ignore_ascii_case( "module" ));
            } else if name.eq_ignore_ascii_case( "src" ) {
                has_src = true ;
            }
        }
        if is_module && !has_src { scripts.push( body ) }

        cursor = tag_end + 1 + body_len + CLOSE_TAG.len();

    }

    scripts

}

/// Offset of the `>` closing the tag that starts before `from`, ignoring any inside
/// quoted attribute values.
fn find_tag_end( text: &str, from: usize ) -> Option<usize> {
    let mut quote = None ;
    text[from..].char_indices().find_map(|( offset, c )| {
        match ( quote, c ) {
            ( Some( open ), c ) if c == open => quote = None,
            ( Some( _ ), _ ) => {},
            ( None, '"' | '\'' ) => quote = Some( c ),
            ( None, '>' ) => return Some( from + offset ),
            ( None, _ ) => {},
        }
        None
    })
}

/// `name[=value]` pairs of a tag's attribute text.
struct Attributes<'a> {
    text: &'a str,
}

impl<'a> Attributes<'a> {

    fn new( text: &'a str ) -> Self { Self { text }}

    fn skip( &mut self, predicate: impl Fn( char ) -> bool ) {
        self.text = self.text.trim_start_matches( predicate );
    }

    fn take( &mut self, predicate: impl Fn( char ) -> bool ) -> &'a str {
        let end = self.text.find(| c | !predicate( c )).unwrap_or( self.text.len() );
        let ( taken, rest ) = self.text.split_at( end );
        self.text = rest ;
        taken
    }

}

impl<'a> Iterator for Attributes<'a> {
    type Item = ( &'a str, Option<&'a str> );

    fn next( &mut self ) -> Option<Self::Item> {

        self.skip(| c | c.is_whitespace() || c == '/' );
        if self.text.is_empty() { return None }

        let name = self.take(| c | !( c.is_whitespace() || c == '=' || c == '/' ));
        if name.is_empty() {
            // a stray '=' with no name
            self.text = &self.text[1..];
            return self.next();
        }

        let before_value = self.text ;
        self.skip( char::is_whitespace );
        if !self.text.starts_with( '=' ) {
            self.text = before_value ;
            return Some(( name, None ));
        }
        self.text = &self.text[1..];
        self.skip( char::is_whitespace );

        let value = match self.text.chars().next() {
            Some( quote @ ( '"' | '\'' )) => {
                self.text = &self.text[1..];
                let value = self.take(| c | c != quote );
                if !self.text.is_empty() { self.text = &self.text[1..] }
                value
            },
            _ => self.take(| c | !c.is_whitespace() ),
        };

        Some(( name, Some( value )))

    }
}
