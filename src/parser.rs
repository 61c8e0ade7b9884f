//! Import/export recognition and body rewriting.
//!
//! The recognizer only looks at top-level statements (brace depth 0). Imports are
//! cut out of the text and recorded, exports are turned into plain declarations
//! and copied into `module.exports` by assignments appended after the body.
//! The rewritten text is then compiled into the [`CompiledUnit`] that the
//! evaluator invokes.

use std::ops::Range ;
use itertools::Itertools ;
use nonempty_collections::{ NEVec, NonEmptyIterator };
use thiserror::Error ;

use crate::token::{ tokenize, LexError, Token, TokenKind };
use crate::script::{ CompiledUnit, CompileError };
use crate::utils::PartialSuccess ;



/// Local name given to an export that has no name of its own.
pub const PLACEHOLDER_EXPORT: &str = "MODULE_DEFAULTS" ;

const DECLARING_KEYWORDS: [&str; 5] = [ "var", "let", "const", "function", "class" ];

/// Errors that make a source unit unusable.
#[derive( Debug, Error, Clone, PartialEq )]
pub enum ParseError {
    #[error( "{0}" )] Lex( #[from] LexError ),
    #[error( "Malformed import statement on line {line}" )] MalformedImport { line: usize },
    #[error( "Malformed export statement on line {line}" )] MalformedExport { line: usize },
    /// Two anonymous exports, or an anonymous export next to a user binding of the reserved name.
    #[error( "Anonymous export collides with '{}' on line {line}", PLACEHOLDER_EXPORT )]
    PlaceholderCollision { line: usize },
    #[error( "Failed to compile module body: {0}" )] Compile( #[from] CompileError ),
}

/// Non-fatal findings; the module still loads.
#[derive( Debug, Error, Clone, PartialEq, Eq )]
pub enum ParseWarning {
    /// An export whose name could not be determined was bound to the placeholder.
    #[error( "Exports might not be working for line {line}: {text}" )]
    UnreliableExport { line: usize, text: String },
}

/// The result of parsing one source unit.
#[derive( Debug )]
pub struct ParsedModule {
    pub imports: Vec<Import>,
    pub exports: Vec<ExportBinding>,
    pub script: ModuleScript,
}

impl ParsedModule {
    /// Exported names, in export order.
    pub fn export_names( &self ) -> impl Iterator<Item = &str> {
        self.exports.iter().map(| export | export.exported.as_str() )
    }
}

/// The rewritten body together with its compiled form.
#[derive( Debug )]
pub struct ModuleScript {
    source: String,
    unit: CompiledUnit,
}

impl ModuleScript {
    #[inline] pub fn source( &self ) -> &str { &self.source }
    #[inline] pub fn unit( &self ) -> &CompiledUnit { &self.unit }
}

/// One import statement, before resolution.
#[derive( Debug, Clone, PartialEq, Eq )]
pub struct Import {
    pub specifier: String,
    pub binding: ImportBinding,
    pub line: usize,
}

/// How a dependency's exports are bound into the importing scope.
#[derive( Debug, Clone, PartialEq, Eq )]
pub enum ImportBinding {
    /// The whole export object under one name (`import a from` or `import * as a from`).
    Whole( String ),
    /// Individual exports (`import { a, b as c } from`).
    Named( NEVec<ImportName> ),
    /// Nothing is bound; the dependency is only loaded and evaluated.
    SideEffect,
}

impl ImportBinding {
    /// Names this binding introduces into the importing scope.
    pub fn local_names( &self ) -> Vec<&str> { match self {
        Self::Whole( name ) => vec![ name.as_str() ],
        Self::Named( names ) => names.nonempty_iter().map(| name | name.local.as_str() ).collect(),
        Self::SideEffect => Vec::new(),
    }}
}

#[derive( Debug, Clone, PartialEq, Eq )]
pub struct ImportName {
    pub imported: String,
    pub local: String,
}

/// A local binding copied into `module.exports` under `exported`.
#[derive( Debug, Clone, PartialEq, Eq )]
pub struct ExportBinding {
    pub local: String,
    pub exported: String,
}

/// Parses `source`, rewriting its body and compiling the result.
///
/// `origin` is the canonical path of the unit, `None` for inline scripts; it only
/// appears in the provenance comment of the rewritten text.
///
/// # Errors
/// Fails on malformed import or export statements, placeholder collisions and
/// bodies the script runtime cannot compile.
pub fn parse(
    source: &str,
    origin: Option<&str>,
) -> Result<PartialSuccess<ParsedModule, ParseWarning>, ParseError> {

    let tokens = tokenize( source )?;
    let mut recognizer = Recognizer {
        source,
        tokens: &tokens,
        edits: Vec::new(),
        imports: Vec::new(),
        exports: Vec::new(),
        warnings: Vec::new(),
        anonymous_line: None,
        placeholder_bound: None,
    };

    let mut depth = 0_usize ;
    let mut index = 0 ;
    while let Some( token ) = tokens.get( index ) {
        let after_dot = index.checked_sub( 1 )
            .and_then(| previous | tokens.get( previous ))
            .is_some_and(| previous | previous.is_punct( '.' ));
        index = match &token.kind {
            TokenKind::Punct( '{' ) => { depth += 1 ; index + 1 },
            TokenKind::Punct( '}' ) => { depth = depth.saturating_sub( 1 ); index + 1 },
            TokenKind::Ident( word ) if depth == 0 && !after_dot && word == "import" => recognizer.import( index )?,
            TokenKind::Ident( word ) if depth == 0 && !after_dot && word == "export" => recognizer.export( index )?,
            _ => index + 1,
        };
    }

    if recognizer.anonymous_line.is_some() {
        let clash = [ recognizer.placeholder_bound, placeholder_binding( &tokens ) ].into_iter().flatten().min();
        if let Some( line ) = clash { return Err( ParseError::PlaceholderCollision { line }) }
    }

    let Recognizer { edits, imports, exports, warnings, .. } = recognizer ;

    let body = apply_edits( source, &edits );
    let copy_out = exports.iter()
        .map(| export | format!( "module.exports.{} = {};", export.exported, export.local ))
        .join( "\n" );
    let rewritten = format!( "// Module src: {}\n{}\n{}", origin.unwrap_or( "inline" ), body, copy_out );
    let unit = CompiledUnit::compile( &rewritten )?;

    Ok(( ParsedModule { imports, exports, script: ModuleScript { source: rewritten, unit }}, warnings ))

}

struct Recognizer<'a> {
    source: &'a str,
    tokens: &'a [Token],
    edits: Vec<( Range<usize>, String )>,
    imports: Vec<Import>,
    exports: Vec<ExportBinding>,
    warnings: Vec<ParseWarning>,
    anonymous_line: Option<usize>,
    /// First line where an import or export list binds the placeholder name.
    placeholder_bound: Option<usize>,
}

impl Recognizer<'_> {

    #[inline] fn token( &self, index: usize ) -> Option<&Token> { self.tokens.get( index ) }

    fn ident( &self, index: usize ) -> Option<&str> { self.token( index ).and_then( Token::ident ) }

    fn is_punct( &self, index: usize, expected: char ) -> bool {
        self.token( index ).is_some_and(| token | token.is_punct( expected ))
    }

    fn is_ident( &self, index: usize, expected: &str ) -> bool {
        self.token( index ).is_some_and(| token | token.is_ident( expected ))
    }

    /// Span of the tokens `start..end`, or the empty span at the end of the source.
    fn span( &self, start: usize, end: usize ) -> Range<usize> {
        let from = self.token( start ).map_or( self.source.len(), | token | token.span.start );
        let to = end.checked_sub( 1 )
            .and_then(| last | self.token( last ))
            .map_or( from, | token | token.span.end );
        from..to
    }

    /// Cuts tokens `start..end` out of the text, keeping their line breaks.
    fn remove( &mut self, start: usize, end: usize ) {
        let span = self.span( start, end );
        let newlines = self.source[span.clone()].matches( '\n' ).count();
        self.edits.push(( span, "\n".repeat( newlines )));
    }

    /// Parses `{ a, b as c }` starting after the opening brace; returns the index past
    /// the closing brace.
    fn name_list( &self, mut index: usize ) -> Option<( Vec<( String, String )>, usize )> {
        let mut names = Vec::new();
        loop {
            if self.is_punct( index, '}' ) { return Some(( names, index + 1 )) }
            let name = self.ident( index )?.to_string();
            index += 1 ;
            let alias = match self.is_ident( index, "as" ) {
                true => {
                    let alias = self.ident( index + 1 )?.to_string();
                    index += 2 ;
                    alias
                },
                false => name.clone(),
            };
            names.push(( name, alias ));
            if self.is_punct( index, ',' ) { index += 1 }
            else if !self.is_punct( index, '}' ) { return None }
        }
    }

    fn import( &mut self, start: usize ) -> Result<usize, ParseError> {

        let line = self.tokens[start].line ;
        let malformed = || ParseError::MalformedImport { line };

        let mut index = start + 1 ;
        let binding = match self.token( index ).map(| token | &token.kind ) {
            Some( TokenKind::Str( _ )) => ImportBinding::SideEffect,
            Some( TokenKind::Punct( '{' )) => {
                let ( names, next ) = self.name_list( index + 1 ).ok_or_else( malformed )?;
                index = next ;
                let mut names = names.into_iter().map(|( imported, local )| ImportName { imported, local });
                match names.next() {
                    Some( first ) => {
                        let mut named = NEVec::new( first );
                        names.for_each(| name | named.push( name ));
                        ImportBinding::Named( named )
                    },
                    None => ImportBinding::SideEffect,
                }
            },
            Some( TokenKind::Punct( '*' )) => {
                if !self.is_ident( index + 1, "as" ) { return Err( malformed() ) }
                let namespace = self.ident( index + 2 ).ok_or_else( malformed )?.to_string();
                index += 3 ;
                ImportBinding::Whole( namespace )
            },
            Some( TokenKind::Ident( name )) => {
                let name = name.clone();
                index += 1 ;
                ImportBinding::Whole( name )
            },
            _ => return Err( malformed() ),
        };

        if binding != ImportBinding::SideEffect || !self.token( index ).is_some_and(| token | token.string().is_some() ) {
            if !self.is_ident( index, "from" ) { return Err( malformed() ) }
            index += 1 ;
        }

        let specifier = self.token( index )
            .and_then( Token::string )
            .ok_or_else( malformed )?
            .to_string();
        index += 1 ;
        if self.is_punct( index, ';' ) { index += 1 }

        self.remove( start, index );
        if binding.local_names().contains( &PLACEHOLDER_EXPORT ) {
            self.placeholder_bound.get_or_insert( line );
        }
        self.imports.push( Import { specifier, binding, line });
        Ok( index )

    }

    fn export( &mut self, start: usize ) -> Result<usize, ParseError> {

        let line = self.tokens[start].line ;
        let malformed = || ParseError::MalformedExport { line };

        let mut index = start + 1 ;
        let is_default = self.is_ident( index, "default" );
        if is_default { index += 1 }

        if !is_default && self.is_punct( index, '{' ) {
            let ( names, mut next ) = self.name_list( index + 1 ).ok_or_else( malformed )?;
            if self.is_ident( next, "from" ) { return Err( malformed() ) }
            if self.is_punct( next, ';' ) { next += 1 }
            self.remove( start, next );
            if names.iter().any(|( _, exported )| exported == PLACEHOLDER_EXPORT ) {
                self.placeholder_bound.get_or_insert( line );
            }
            self.exports.extend( names.into_iter().map(|( local, exported )| ExportBinding { local, exported }));
            return Ok( next );
        }

        if self.token( index ).is_none() || ( !is_default && self.is_punct( index, '*' )) { return Err( malformed() ) }
        let name_at = match self.ident( index ) {
            Some( "async" ) if self.is_ident( index + 1, "function" ) => Some( index + 2 ),
            Some( "function" | "class" | "var" | "let" | "const" ) => Some( index + 1 ),
            _ => None,
        };
        let name_at = match name_at {
            Some( at ) if self.is_punct( at, '*' ) => Some( at + 1 ),
            other => other,
        };
        let name = name_at
            .and_then(| at | self.ident( at ))
            .filter(| name | *name != "extends" )
            .map( str::to_string );

        // The keyword stays and declares the name
        let prefix = self.tokens[start].span.start..self.span( index, index + 1 ).start ;

        match name {
            Some( name ) => {
                self.edits.push(( prefix, String::new() ));
                self.exports.push( ExportBinding { local: name.clone(), exported: name });
            },
            None => {
                if self.anonymous_line.is_some() { return Err( ParseError::PlaceholderCollision { line }) }
                self.anonymous_line = Some( line );
                let text = self.source.lines().nth( line - 1 ).unwrap_or_default().trim().to_string();
                self.warnings.push( ParseWarning::UnreliableExport { line, text });
                self.edits.push(( prefix, format!( "let {} = ", PLACEHOLDER_EXPORT )));
                self.exports.push( ExportBinding {
                    local: PLACEHOLDER_EXPORT.to_string(),
                    exported: PLACEHOLDER_EXPORT.to_string(),
                });
            },
        }

        Ok( index )

    }

}

/// Line of the first token that binds the placeholder name: a declared name, or
/// the target of a plain assignment. Property reads and object keys don't count.
fn placeholder_binding( tokens: &[Token] ) -> Option<usize> {
    tokens.iter().enumerate()
        .filter(|( _, token )| token.is_ident( PLACEHOLDER_EXPORT ))
        .find(|&( index, _ )| {
            let before = | back: usize | index.checked_sub( back ).and_then(| at | tokens.get( at ));
            let after = | ahead: usize | tokens.get( index + ahead );
            let declared = before( 1 ).is_some_and(| previous | DECLARING_KEYWORDS.iter().any(| keyword | previous.is_ident( keyword )))
                || ( before( 1 ).is_some_and(| previous | previous.is_punct( '*' ))
                    && before( 2 ).is_some_and(| keyword | keyword.is_ident( "function" )));
            let assigned = !before( 1 ).is_some_and(| previous | previous.is_punct( '.' ))
                && after( 1 ).is_some_and(| next | next.is_punct( '=' ))
                && !after( 2 ).is_some_and(| next | next.is_punct( '=' ) || next.is_punct( '>' ));
            declared || assigned
        })
        .map(|( _, token )| token.line )
}

fn apply_edits( source: &str, edits: &[( Range<usize>, String )]) -> String {
    let mut output = String::with_capacity( source.len() );
    let mut cursor = 0 ;
    for ( span, replacement ) in edits {
        output.push_str( &source[cursor..span.start] );
        output.push_str( replacement );
        cursor = span.end ;
    }
    output.push_str( &source[cursor..] );
    output
}
