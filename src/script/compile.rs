use std::rc::Rc ;
use thiserror::Error ;

use crate::token::{ tokenize, LexError, Token, TokenKind };
use super::{ FunctionValue, Value };



/// Errors raised while compiling a rewritten unit body.
///
/// Lines refer to the rewritten body, which starts with the provenance comment.
#[derive( Debug, Error, Clone, PartialEq )]
pub enum CompileError {
    #[error( "{0}" )] Lex( #[from] LexError ),
    #[error( "Unexpected '{found}' on line {line}, expected {expected}" )]
    UnexpectedToken { found: String, expected: String, line: usize },
    #[error( "Unexpected end of input, expected {0}" )]
    UnexpectedEnd( String ),
    /// The construct is valid in the source language but outside the supported subset.
    #[error( "Unsupported syntax '{keyword}' on line {line}" )]
    Unsupported { keyword: String, line: usize },
    #[error( "Invalid assignment target on line {0}" )]
    InvalidAssignmentTarget( usize ),
    #[error( "Expression nested too deeply on line {0}" )]
    NestingTooDeep( usize ),
}

#[derive( Debug )]
pub(crate) enum Stmt {
    Declare { name: String, init: Option<Expr>, line: usize },
    Assign { target: Expr, value: Expr, line: usize },
    Expr { expr: Expr, line: usize },
}

#[derive( Debug )]
pub(crate) enum Expr {
    Literal( Value ),
    Ident( String ),
    Member( Box<Expr>, String ),
    Index( Box<Expr>, Box<Expr> ),
    Call( Box<Expr>, Vec<Expr> ),
    Negate( Box<Expr> ),
    Object( Vec<( String, Expr )> ),
    Array( Vec<Expr> ),
    Function( Rc<FunctionValue> ),
    Class { name: Option<String>, base: Option<Box<Expr>>, body: String },
}

const STATEMENT_KEYWORDS: &[&str] = &[
    "if", "else", "for", "while", "do", "switch", "return", "throw", "try",
    "break", "continue", "import", "export", "with", "debugger",
];

/// Deepest expression the compiler accepts. Counts brackets, unary minus and
/// member/call/index links, since evaluation recurses over all of them.
const MAX_NESTING: usize = 128 ;

const EXPRESSION_KEYWORDS: &[&str] = &[ "new", "typeof", "delete", "void", "await", "yield", "super" ];

pub(crate) fn compile( source: &str ) -> Result<Vec<Stmt>, CompileError> {

    let mut compiler = Compiler { source, tokens: tokenize( source )?, pos: 0, depth: 0 };
    let mut statements = Vec::new();

    while !compiler.at_end() {
        if compiler.eat_punct( ';' ) { continue }
        statements.extend( compiler.statement()? );
        compiler.eat_punct( ';' );
    }

    Ok( statements )

}

struct Compiler<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Compiler<'_> {

    #[inline] fn peek( &self ) -> Option<&Token> { self.tokens.get( self.pos ) }

    #[inline] fn peek_at( &self, offset: usize ) -> Option<&Token> { self.tokens.get( self.pos + offset ) }

    #[inline] fn at_end( &self ) -> bool { self.pos >= self.tokens.len() }

    fn line( &self ) -> usize { self.peek().or( self.tokens.last() ).map_or( 1, | token | token.line ) }

    fn eat_punct( &mut self, expected: char ) -> bool {
        let found = self.peek().is_some_and(| token | token.is_punct( expected ));
        if found { self.pos += 1 }
        found
    }

    fn eat_ident( &mut self, expected: &str ) -> bool {
        let found = self.peek().is_some_and(| token | token.is_ident( expected ));
        if found { self.pos += 1 }
        found
    }

    fn unexpected( &self, expected: impl Into<String> ) -> CompileError { match self.peek() {
        Some( token ) => CompileError::UnexpectedToken { found: token.describe(), expected: expected.into(), line: token.line },
        None => CompileError::UnexpectedEnd( expected.into() ),
    }}

    fn expect_punct( &mut self, expected: char ) -> Result<Token, CompileError> {
        match self.peek() {
            Some( token ) if token.is_punct( expected ) => {
                let token = token.clone();
                self.pos += 1 ;
                Ok( token )
            },
            _ => Err( self.unexpected( format!( "'{}'", expected ))),
        }
    }

    fn expect_ident( &mut self, expected: &str ) -> Result<String, CompileError> {
        match self.peek().and_then( Token::ident ) {
            Some( name ) => {
                let name = name.to_string();
                self.pos += 1 ;
                Ok( name )
            },
            None => Err( self.unexpected( expected )),
        }
    }

    fn list<T>(
        &mut self,
        close: char,
        mut item: impl FnMut( &mut Self ) -> Result<T, CompileError>,
    ) -> Result<Vec<T>, CompileError> {
        let mut items = Vec::new();
        loop {
            if self.eat_punct( close ) { return Ok( items ) }
            items.push( item( self )? );
            if !self.eat_punct( ',' ) {
                self.expect_punct( close )?;
                return Ok( items )
            }
        }
    }

    fn statement( &mut self ) -> Result<Vec<Stmt>, CompileError> {

        let line = self.line();
        let keyword = self.peek().and_then( Token::ident ).map( str::to_string );

        match keyword.as_deref() {
            Some( "var" | "let" | "const" ) => {
                self.pos += 1 ;
                self.declarators( line )
            },
            Some( keyword ) if STATEMENT_KEYWORDS.contains( &keyword ) => Err( CompileError::Unsupported {
                keyword: keyword.to_string(),
                line,
            }),
            _ => self.expression_statement( line ).map(| statement | vec![ statement ]),
        }

    }

    fn declarators( &mut self, line: usize ) -> Result<Vec<Stmt>, CompileError> {
        let mut statements = Vec::new();
        loop {
            let name = self.expect_ident( "binding name" )?;
            let init = match self.eat_punct( '=' ) {
                true => Some( self.expression()? ),
                false => None,
            };
            statements.push( Stmt::Declare { name, init, line });
            if !self.eat_punct( ',' ) { return Ok( statements ) }
        }
    }

    fn expression_statement( &mut self, line: usize ) -> Result<Stmt, CompileError> {

        let expr = self.expression()?;

        let is_assignment = self.peek().is_some_and(| token | token.is_punct( '=' ))
            && !self.peek_at( 1 ).is_some_and(| token | token.is_punct( '=' ) || token.is_punct( '>' ));

        if is_assignment {
            self.pos += 1 ;
            if !matches!( expr, Expr::Ident( _ ) | Expr::Member( .. ) | Expr::Index( .. )) {
                return Err( CompileError::InvalidAssignmentTarget( line ));
            }
            let value = self.expression()?;
            return Ok( Stmt::Assign { target: expr, value, line });
        }

        // Named function and class declarations bind their name
        Ok( match expr {
            Expr::Function( function ) if function.name.is_some() => Stmt::Declare {
                name: function.name.clone().unwrap_or_default(),
                init: Some( Expr::Function( function )),
                line,
            },
            Expr::Class { name: Some( name ), base, body } => Stmt::Declare {
                name: name.clone(),
                init: Some( Expr::Class { name: Some( name ), base, body }),
                line,
            },
            expr => Stmt::Expr { expr, line },
        })

    }

    fn expression( &mut self ) -> Result<Expr, CompileError> {
        let depth = self.depth ;
        let expr = self.nested_expression();
        self.depth = depth ;
        expr
    }

    fn nest( &mut self ) -> Result<(), CompileError> {
        self.depth += 1 ;
        match self.depth > MAX_NESTING {
            true => Err( CompileError::NestingTooDeep( self.line() )),
            false => Ok(()),
        }
    }

    fn nested_expression( &mut self ) -> Result<Expr, CompileError> {

        self.nest()?;
        if self.eat_punct( '-' ) { return Ok( Expr::Negate( Box::new( self.expression()? ))) }

        let mut expr = self.primary()?;
        loop {
            if matches!( self.peek().map(| token | &token.kind ), Some( TokenKind::Punct( '.' | '(' | '[' ))) {
                self.nest()?;
            }
            if self.eat_punct( '.' ) {
                let key = self.expect_ident( "property name" )?;
                expr = Expr::Member( Box::new( expr ), key );
            } else if self.eat_punct( '(' ) {
                let args = self.list( ')', Self::expression )?;
                expr = Expr::Call( Box::new( expr ), args );
            } else if self.eat_punct( '[' ) {
                let index = self.expression()?;
                self.expect_punct( ']' )?;
                expr = Expr::Index( Box::new( expr ), Box::new( index ));
            } else {
                return Ok( expr )
            }
        }

    }

    fn primary( &mut self ) -> Result<Expr, CompileError> {

        let Some( token ) = self.peek().cloned() else { return Err( self.unexpected( "expression" )) };

        match token.kind {
            TokenKind::Number( value ) => { self.pos += 1 ; Ok( Expr::Literal( Value::Number( value ))) },
            TokenKind::Str( value ) => { self.pos += 1 ; Ok( Expr::Literal( Value::from( value ))) },
            TokenKind::Punct( '(' ) => {
                self.pos += 1 ;
                let expr = self.expression()?;
                self.expect_punct( ')' )?;
                Ok( expr )
            },
            TokenKind::Punct( '{' ) => { self.pos += 1 ; self.object_literal() },
            TokenKind::Punct( '[' ) => { self.pos += 1 ; Ok( Expr::Array( self.list( ']', Self::expression )? )) },
            TokenKind::Punct( _ ) => Err( self.unexpected( "expression" )),
            TokenKind::Ident( name ) => match name.as_str() {
                "true" => { self.pos += 1 ; Ok( Expr::Literal( Value::Bool( true ))) },
                "false" => { self.pos += 1 ; Ok( Expr::Literal( Value::Bool( false ))) },
                "null" => { self.pos += 1 ; Ok( Expr::Literal( Value::Null )) },
                "undefined" => { self.pos += 1 ; Ok( Expr::Literal( Value::Undefined )) },
                "function" => self.function().map(| function | Expr::Function( Rc::new( function ))),
                "async" if self.peek_at( 1 ).is_some_and(| next | next.is_ident( "function" )) =>
                    self.function().map(| function | Expr::Function( Rc::new( function ))),
                "class" => self.class(),
                keyword if EXPRESSION_KEYWORDS.contains( &keyword ) || STATEMENT_KEYWORDS.contains( &keyword ) =>
                    Err( CompileError::Unsupported { keyword: keyword.to_string(), line: token.line }),
                _ => { self.pos += 1 ; Ok( Expr::Ident( name.clone() )) },
            },
        }

    }

    fn object_literal( &mut self ) -> Result<Expr, CompileError> {
        self.list( '}', | compiler | {
            let key = match compiler.peek().map(| token | &token.kind ) {
                Some( TokenKind::Ident( name )) => name.clone(),
                Some( TokenKind::Str( value )) => value.clone(),
                Some( TokenKind::Number( value )) => value.to_string(),
                _ => return Err( compiler.unexpected( "property name" )),
            };
            compiler.pos += 1 ;
            let value = match compiler.eat_punct( ':' ) {
                true => compiler.expression()?,
                false => Expr::Ident( key.clone() ),
            };
            Ok(( key, value ))
        }).map( Expr::Object )
    }

    fn function( &mut self ) -> Result<FunctionValue, CompileError> {
        self.eat_ident( "async" );
        if !self.eat_ident( "function" ) { return Err( self.unexpected( "'function'" )) }
        self.eat_punct( '*' );
        let name = match self.peek().and_then( Token::ident ) {
            Some( name ) => {
                let name = name.to_string();
                self.pos += 1 ;
                Some( name )
            },
            None => None,
        };
        self.expect_punct( '(' )?;
        let params = self.list( ')', | compiler | compiler.expect_ident( "parameter name" ))?;
        let body = self.block()?;
        Ok( FunctionValue { name, params, body })
    }

    fn class( &mut self ) -> Result<Expr, CompileError> {
        self.pos += 1 ;
        let name = match self.peek().and_then( Token::ident ) {
            Some( name ) if name != "extends" => {
                let name = name.to_string();
                self.pos += 1 ;
                Some( name )
            },
            _ => None,
        };
        let base = match self.eat_ident( "extends" ) {
            true => Some( Box::new( self.expression()? )),
            false => None,
        };
        let body = self.block()?;
        Ok( Expr::Class { name, base, body })
    }

    /// Consumes a balanced `{ .. }` block and returns its inner text.
    fn block( &mut self ) -> Result<String, CompileError> {
        let open = self.expect_punct( '{' )?;
        let mut depth = 1_usize ;
        while let Some( token ) = self.tokens.get( self.pos ) {
            self.pos += 1 ;
            match token.kind {
                TokenKind::Punct( '{' ) => depth += 1,
                TokenKind::Punct( '}' ) => {
                    depth -= 1 ;
                    if depth == 0 { return Ok( self.source[open.span.end..token.span.start].trim().to_string() ) }
                },
                _ => {},
            }
        }
        Err( CompileError::UnexpectedEnd( "'}'".to_string() ))
    }

}
