//! Restricted-grammar tokenizer.
//!
//! Both the import/export recognizer and the unit compiler work on the same token
//! stream. Comments are skipped, everything that isn't an identifier, a literal or
//! whitespace becomes a single-character [`TokenKind::Punct`]. Every token keeps its
//! byte span so the recognizer can rewrite the source text in place.

use std::iter::Peekable ;
use std::ops::Range ;
use std::str::CharIndices ;
use thiserror::Error ;



/// Errors produced while splitting source text into tokens.
#[derive( Debug, Error, Clone, PartialEq, Eq )]
pub enum LexError {
    /// A string literal was still open at the end of the input.
    #[error( "Unterminated string starting on line {0}" )] UnterminatedString( usize ),
    /// A block comment was still open at the end of the input.
    #[error( "Unterminated comment starting on line {0}" )] UnterminatedComment( usize ),
}

#[derive( Debug, Clone, PartialEq )]
pub(crate) enum TokenKind {
    Ident( String ),
    Str( String ),
    Number( f64 ),
    Punct( char ),
}

#[derive( Debug, Clone, PartialEq )]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub span: Range<usize>,
    pub line: usize,
}

impl Token {

    #[inline] pub fn ident( &self ) -> Option<&str> { match &self.kind {
        TokenKind::Ident( name ) => Some( name ),
        _ => None,
    }}

    #[inline] pub fn is_ident( &self, expected: &str ) -> bool { self.ident() == Some( expected ) }

    #[inline] pub fn is_punct( &self, expected: char ) -> bool { self.kind == TokenKind::Punct( expected ) }

    #[inline] pub fn string( &self ) -> Option<&str> { match &self.kind {
        TokenKind::Str( value ) => Some( value ),
        _ => None,
    }}

    /// Source-like rendering used in error messages.
    pub fn describe( &self ) -> String { match &self.kind {
        TokenKind::Ident( name ) => name.clone(),
        TokenKind::Str( value ) => format!( "{:?}", value ),
        TokenKind::Number( value ) => value.to_string(),
        TokenKind::Punct( c ) => c.to_string(),
    }}

}

/// Splits `source` into tokens.
pub(crate) fn tokenize( source: &str ) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer { source, chars: source.char_indices().peekable(), line: 1 };
    let mut tokens = Vec::new();
    while let Some( token ) = lexer.next_token()? { tokens.push( token ); }
    Ok( tokens )
}

struct Lexer<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
    line: usize,
}

impl Lexer<'_> {

    fn bump( &mut self ) -> Option<char> {
        let ( _, c ) = self.chars.next()?;
        if c == '\n' { self.line += 1 }
        Some( c )
    }

    #[inline] fn peek( &mut self ) -> Option<char> { self.chars.peek().map(|( _, c )| *c ) }

    fn peek_second( &self ) -> Option<char> {
        let mut lookahead = self.chars.clone();
        lookahead.next();
        lookahead.next().map(|( _, c )| c )
    }

    #[inline] fn offset( &mut self ) -> usize {
        let end = self.source.len();
        self.chars.peek().map_or( end, |( offset, _ )| *offset )
    }

    fn next_token( &mut self ) -> Result<Option<Token>, LexError> {

        loop { match self.peek() {
            None => return Ok( None ),
            Some( c ) if c.is_whitespace() => { self.bump(); },
            Some( '/' ) if self.peek_second() == Some( '/' ) => self.skip_line_comment(),
            Some( '/' ) if self.peek_second() == Some( '*' ) => self.skip_block_comment()?,
            Some( _ ) => break,
        }}

        let start = self.offset();
        let line = self.line ;
        let kind = match self.peek() {
            Some( quote @ ( '"' | '\'' | '`' )) => self.read_string( quote )?,
            Some( c ) if c.is_ascii_digit() => self.read_number(),
            Some( c ) if is_ident_start( c ) => self.read_ident(),
            Some( c ) => { self.bump(); TokenKind::Punct( c ) },
            None => return Ok( None ),
        };

        Ok( Some( Token { kind, span: start..self.offset(), line }))

    }

    fn skip_line_comment( &mut self ) {
        while let Some( c ) = self.peek() {
            if c == '\n' { break }
            self.bump();
        }
    }

    fn skip_block_comment( &mut self ) -> Result<(), LexError> {
        let line = self.line ;
        self.bump();
        self.bump();
        loop { match self.bump() {
            None => return Err( LexError::UnterminatedComment( line )),
            Some( '*' ) if self.peek() == Some( '/' ) => { self.bump(); return Ok(()) },
            Some( _ ) => {},
        }}
    }

    fn read_string( &mut self, quote: char ) -> Result<TokenKind, LexError> {
        let line = self.line ;
        self.bump();
        let mut value = String::new();
        loop { match self.bump() {
            None => return Err( LexError::UnterminatedString( line )),
            Some( c ) if c == quote => return Ok( TokenKind::Str( value )),
            Some( '\\' ) => match self.bump() {
                None => return Err( LexError::UnterminatedString( line )),
                Some( 'n' ) => value.push( '\n' ),
                Some( 't' ) => value.push( '\t' ),
                Some( 'r' ) => value.push( '\r' ),
                Some( '0' ) => value.push( '\0' ),
                Some( escaped ) => value.push( escaped ),
            },
            Some( c ) => value.push( c ),
        }}
    }

    fn read_number( &mut self ) -> TokenKind {
        let start = self.offset();
        let mut seen_dot = false ;
        while let Some( c ) = self.peek() {
            let is_fraction = c == '.' && !seen_dot && self.peek_second().is_some_and(| next | next.is_ascii_digit() );
            if !( c.is_ascii_digit() || is_fraction ) { break }
            seen_dot |= is_fraction ;
            self.bump();
        }
        let end = self.offset();
        // digits with at most one inner dot always parse
        TokenKind::Number( self.source[start..end].parse().unwrap_or_default() )
    }

    fn read_ident( &mut self ) -> TokenKind {
        let start = self.offset();
        while self.peek().is_some_and( is_ident_continue ) { self.bump(); }
        let end = self.offset();
        TokenKind::Ident( self.source[start..end].to_string() )
    }

}

#[inline] fn is_ident_start( c: char ) -> bool { c.is_alphabetic() || c == '_' || c == '$' }

#[inline] fn is_ident_continue( c: char ) -> bool { c.is_alphanumeric() || c == '_' || c == '$' }
