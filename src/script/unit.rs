use std::collections::HashMap ;
use std::rc::Rc ;
use thiserror::Error ;

use super::compile::{ compile, Expr, Stmt };
use super::{ Bindings, ClassValue, CompileError, Object, Value };



/// Errors raised while executing a unit body or returned by a native function.
#[derive( Debug, Error, Clone, PartialEq )]
pub enum ExecError {
    #[error( "{0} is not defined" )] UnboundIdentifier( String ),
    #[error( "Cannot read property '{key}' of {target}" )]
    PropertyOfNothing { key: String, target: &'static str },
    #[error( "Cannot set property '{key}' on {target}" )]
    NotAnObject { key: String, target: &'static str },
    #[error( "A value of type {0} cannot be used as a property key" )] InvalidPropertyKey( &'static str ),
    #[error( "Invalid assignment target" )] InvalidAssignmentTarget,
    #[error( "A value of type {0} is not callable" )] NotCallable( &'static str ),
    #[error( "Cannot negate a value of type {0}" )] NotANumber( &'static str ),
    /// Raised by a native function.
    #[error( "{0}" )] Native( String ),
}

/// An [`ExecError`] located at the statement that raised it.
#[derive( Debug, Error, Clone, PartialEq )]
#[error( "Line {line}: {error}" )]
pub struct RuntimeError {
    pub line: usize,
    #[source] pub error: ExecError,
}

/// A unit body compiled ahead of time.
///
/// Invoking it runs each statement once, in order, in a fresh scope seeded from the
/// parameters. The unit itself is immutable and can be invoked any number of times;
/// the loader invokes each module's unit exactly once.
#[derive( Debug )]
pub struct CompiledUnit {
    statements: Vec<Stmt>,
}

impl CompiledUnit {

    /// Compiles `source`.
    ///
    /// # Errors
    /// Returns a [`CompileError`] for syntax outside the supported subset.
    pub fn compile( source: &str ) -> Result<Self, CompileError> {
        Ok( Self { statements: compile( source )? })
    }

    /// Number of top-level statements.
    pub fn statement_count( &self ) -> usize { self.statements.len() }

    /// Runs the body with `params` bound positionally to `args`. Missing arguments
    /// are `undefined`, surplus ones are ignored.
    ///
    /// # Errors
    /// Stops at the first failing statement and returns its [`RuntimeError`].
    pub fn invoke( &self, params: &[String], args: Vec<Value> ) -> Result<(), RuntimeError> {
        let mut scope = Scope::default();
        params.iter()
            .zip( args.into_iter().chain( std::iter::repeat( Value::Undefined )))
            .for_each(|( name, value )| { scope.values.insert( name.clone(), value ); });
        self.statements.iter().try_for_each(| statement | scope.execute( statement ))
    }

    /// Runs the body with every binding as a parameter, in binding order.
    ///
    /// # Errors
    /// See [`CompiledUnit::invoke`].
    pub fn call( &self, bindings: Bindings ) -> Result<(), RuntimeError> {
        let ( params, args ) = bindings.into_parts();
        self.invoke( &params, args )
    }

}

#[derive( Default )]
struct Scope {
    values: HashMap<String, Value>,
}

#[inline] fn at( line: usize ) -> impl FnOnce( ExecError ) -> RuntimeError {
    move | error | RuntimeError { line, error }
}

impl Scope {

    fn execute( &mut self, statement: &Stmt ) -> Result<(), RuntimeError> {
        match statement {
            Stmt::Declare { name, init: Some( init ), line } => {
                let value = self.evaluate( init ).map_err( at( *line ))?;
                self.values.insert( name.clone(), value );
            },
            // A bare redeclaration keeps the current value
            Stmt::Declare { name, init: None, .. } => {
                self.values.entry( name.clone() ).or_default();
            },
            Stmt::Assign { target, value, line } => self.assign( target, value ).map_err( at( *line ))?,
            Stmt::Expr { expr, line } => { self.evaluate( expr ).map_err( at( *line ))?; },
        }
        Ok(())
    }

    fn assign( &mut self, target: &Expr, value: &Expr ) -> Result<(), ExecError> {
        let value = self.evaluate( value )?;
        match target {
            Expr::Ident( name ) => match self.values.get_mut( name ) {
                Some( slot ) => { *slot = value ; Ok(()) },
                None => Err( ExecError::UnboundIdentifier( name.clone() )),
            },
            Expr::Member( object, key ) => set_property( &self.evaluate( object )?, key, value ),
            Expr::Index( object, key ) => {
                let object = self.evaluate( object )?;
                let key = property_key( &self.evaluate( key )? )?;
                set_property( &object, &key, value )
            },
            _ => Err( ExecError::InvalidAssignmentTarget ),
        }
    }

    fn evaluate( &self, expr: &Expr ) -> Result<Value, ExecError> { Ok( match expr {
        Expr::Literal( value ) => value.clone(),
        Expr::Ident( name ) => self.values.get( name )
            .cloned()
            .ok_or_else(|| ExecError::UnboundIdentifier( name.clone() ))?,
        Expr::Member( object, key ) => self.evaluate( object )?.property( key )?,
        Expr::Index( object, key ) => {
            let object = self.evaluate( object )?;
            let key = property_key( &self.evaluate( key )? )?;
            object.property( &key )?
        },
        Expr::Call( callee, args ) => {
            let callee = self.evaluate( callee )?;
            let args = args.iter()
                .map(| arg | self.evaluate( arg ))
                .collect::<Result<Vec<_>, _>>()?;
            match callee {
                Value::Native( function ) => function( &args )?,
                other => return Err( ExecError::NotCallable( other.type_name() )),
            }
        },
        Expr::Negate( operand ) => match self.evaluate( operand )? {
            Value::Number( value ) => Value::Number( -value ),
            other => return Err( ExecError::NotANumber( other.type_name() )),
        },
        Expr::Object( entries ) => entries.iter()
            .map(|( key, value )| Ok(( key.clone(), self.evaluate( value )? )))
            .collect::<Result<Vec<_>, ExecError>>()?
            .into_iter()
            .collect::<Object>()
            .into(),
        Expr::Array( items ) => Value::Array( items.iter()
            .map(| item | self.evaluate( item ))
            .collect::<Result<Vec<_>, _>>()?
            .into()
        ),
        Expr::Function( function ) => Value::Function( Rc::clone( function )),
        Expr::Class { name, base, body } => Value::Class( Rc::new( ClassValue {
            name: name.clone(),
            base: base.as_deref().map(| base | self.evaluate( base )).transpose()?,
            body: body.clone(),
        })),
    })}

}

fn set_property( target: &Value, key: &str, value: Value ) -> Result<(), ExecError> {
    match target {
        Value::Object( object ) => { object.set( key, value ); Ok(()) },
        other => Err( ExecError::NotAnObject { key: key.to_string(), target: other.type_name() }),
    }
}

fn property_key( key: &Value ) -> Result<String, ExecError> { match key {
    Value::String( key ) => Ok( key.to_string() ),
    Value::Number( index ) => Ok( index.to_string() ),
    other => Err( ExecError::InvalidPropertyKey( other.type_name() )),
}}
