use std::cell::RefCell ;
use std::collections::BTreeMap ;
use std::rc::Rc ;

use super::ExecError ;



/// Host function callable from a unit body.
pub type NativeFn = Rc<dyn Fn( &[Value] ) -> Result<Value, ExecError>>;

/// A value a unit body can hold, bind, export or pass to a native function.
///
/// Objects, arrays, functions, classes and natives are reference values: cloning
/// one yields another handle to the same thing and equality is identity.
/// Primitives compare by value.
#[derive( Clone, Default )]
pub enum Value {
    #[default] Undefined,
    Null,
    Bool( bool ),
    Number( f64 ),
    String( Rc<str> ),
    Array( Rc<[Value]> ),
    Object( Object ),
    /// A declared script function. Bodies are carried as text and are not callable.
    Function( Rc<FunctionValue> ),
    /// A declared script class.
    Class( Rc<ClassValue> ),
    /// A host function, typically injected by a deps plugin.
    Native( NativeFn ),
}

impl Value {

    /// Wraps a host closure so unit bodies can call it.
    pub fn native( function: impl Fn( &[Value] ) -> Result<Value, ExecError> + 'static ) -> Self {
        Self::Native( Rc::new( function ))
    }

    /// Name of the value's type, as used in error messages.
    pub fn type_name( &self ) -> &'static str { match self {
        Self::Undefined => "undefined",
        Self::Null => "null",
        Self::Bool( _ ) => "boolean",
        Self::Number( _ ) => "number",
        Self::String( _ ) => "string",
        Self::Array( _ ) => "array",
        Self::Object( _ ) => "object",
        Self::Function( _ ) => "function",
        Self::Class( _ ) => "class",
        Self::Native( _ ) => "native function",
    }}

    #[inline] pub fn as_object( &self ) -> Option<&Object> { match self {
        Self::Object( object ) => Some( object ),
        _ => None,
    }}

    #[inline] pub fn as_str( &self ) -> Option<&str> { match self {
        Self::String( value ) => Some( value ),
        _ => None,
    }}

    #[inline] pub fn as_number( &self ) -> Option<f64> { match self {
        Self::Number( value ) => Some( *value ),
        _ => None,
    }}

    /// Reads property `key`. Missing properties read as `undefined`; reading from
    /// `undefined` or `null` is an error.
    ///
    /// # Errors
    /// Returns [`ExecError::PropertyOfNothing`] when `self` is `undefined` or `null`.
    pub fn property( &self, key: &str ) -> Result<Value, ExecError> { match self {
        Self::Undefined | Self::Null => Err( ExecError::PropertyOfNothing { key: key.to_string(), target: self.type_name() }),
        Self::Object( object ) => Ok( object.get( key )),
        Self::Array( items ) if key == "length" => Ok( Self::Number( items.len() as f64 )),
        Self::String( value ) if key == "length" => Ok( Self::Number( value.chars().count() as f64 )),
        Self::Array( items ) => Ok( key.parse::<usize>().ok()
            .and_then(| index | items.get( index ).cloned() )
            .unwrap_or_default()
        ),
        Self::Function( function ) if key == "name" => Ok( function.name.as_deref().map_or( Self::Undefined, Self::from )),
        Self::Class( class ) if key == "name" => Ok( class.name.as_deref().map_or( Self::Undefined, Self::from )),
        _ => Ok( Self::Undefined ),
    }}

}

impl PartialEq for Value {
    fn eq( &self, other: &Self ) -> bool { match ( self, other ) {
        ( Self::Undefined, Self::Undefined ) | ( Self::Null, Self::Null ) => true,
        ( Self::Bool( a ), Self::Bool( b )) => a == b,
        #[allow( clippy::float_cmp )]
        ( Self::Number( a ), Self::Number( b )) => a == b,
        ( Self::String( a ), Self::String( b )) => a == b,
        ( Self::Array( a ), Self::Array( b )) => Rc::ptr_eq( a, b ),
        ( Self::Object( a ), Self::Object( b )) => a.ptr_eq( b ),
        ( Self::Function( a ), Self::Function( b )) => Rc::ptr_eq( a, b ),
        ( Self::Class( a ), Self::Class( b )) => Rc::ptr_eq( a, b ),
        ( Self::Native( a ), Self::Native( b )) => Rc::ptr_eq( a, b ),
        _ => false,
    }}
}

impl std::fmt::Debug for Value {
    fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result { match self {
        Self::Undefined => write!( f, "undefined" ),
        Self::Null => write!( f, "null" ),
        Self::Bool( value ) => write!( f, "{}", value ),
        Self::Number( value ) => write!( f, "{}", value ),
        Self::String( value ) => write!( f, "{:?}", value ),
        Self::Array( items ) => f.debug_list().entries( items.iter() ).finish(),
        Self::Object( object ) => std::fmt::Debug::fmt( object, f ),
        Self::Function( function ) => write!( f, "[function {}]", function.name.as_deref().unwrap_or( "<anonymous>" )),
        Self::Class( class ) => write!( f, "[class {}]", class.name.as_deref().unwrap_or( "<anonymous>" )),
        Self::Native( _ ) => write!( f, "[native]" ),
    }}
}

impl From<&str> for Value {
    fn from( value: &str ) -> Self { Self::String( Rc::from( value )) }
}
impl From<String> for Value {
    fn from( value: String ) -> Self { Self::String( Rc::from( value )) }
}
impl From<f64> for Value {
    fn from( value: f64 ) -> Self { Self::Number( value ) }
}
impl From<bool> for Value {
    fn from( value: bool ) -> Self { Self::Bool( value ) }
}
impl From<Object> for Value {
    fn from( object: Object ) -> Self { Self::Object( object ) }
}

/// A declared script function.
#[derive( Debug, PartialEq, Eq )]
pub struct FunctionValue {
    pub name: Option<String>,
    pub params: Vec<String>,
    pub body: String,
}

/// A declared script class. `base` is the value its `extends` clause evaluated to.
#[derive( Debug )]
pub struct ClassValue {
    pub name: Option<String>,
    pub base: Option<Value>,
    pub body: String,
}

/// A shared, mutable string-keyed map; the export container type.
#[derive( Clone, Default )]
pub struct Object( Rc<RefCell<BTreeMap<String, Value>>> );

impl Object {

    pub fn new() -> Self { Self::default() }

    /// Returns the property, or `undefined` when absent.
    pub fn get( &self, key: &str ) -> Value { self.0.borrow().get( key ).cloned().unwrap_or_default() }

    pub fn set( &self, key: impl Into<String>, value: Value ) -> Option<Value> {
        self.0.borrow_mut().insert( key.into(), value )
    }

    pub fn contains( &self, key: &str ) -> bool { self.0.borrow().contains_key( key ) }

    pub fn keys( &self ) -> Vec<String> { self.0.borrow().keys().cloned().collect() }

    pub fn len( &self ) -> usize { self.0.borrow().len() }

    pub fn is_empty( &self ) -> bool { self.0.borrow().is_empty() }

    /// Whether both handles refer to the same object.
    pub fn ptr_eq( &self, other: &Self ) -> bool { Rc::ptr_eq( &self.0, &other.0 ) }

}

impl PartialEq for Object {
    fn eq( &self, other: &Self ) -> bool { self.ptr_eq( other ) }
}

impl<K: Into<String>> FromIterator<( K, Value )> for Object {
    fn from_iter<T: IntoIterator<Item = ( K, Value )>>( iter: T ) -> Self {
        let object = Self::new();
        iter.into_iter().for_each(|( key, value )| { object.set( key, value ); });
        object
    }
}

// Only keys are printed; objects may contain themselves.
impl std::fmt::Debug for Object {
    fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
        f.debug_set().entries( self.0.borrow().keys() ).finish()
    }
}

/// The named values a unit body runs with, in parameter order.
///
/// Inserting a name that is already bound replaces its value but keeps its position.
#[derive( Debug, Clone, Default )]
pub struct Bindings {
    entries: Vec<( String, Value )>,
}

impl Bindings {

    pub fn new() -> Self { Self::default() }

    /// Binds `name`, returning the value it replaced.
    pub fn insert( &mut self, name: impl Into<String>, value: Value ) -> Option<Value> {
        let name = name.into();
        match self.entries.iter_mut().find(|( bound, _ )| *bound == name ) {
            Some(( _, slot )) => Some( std::mem::replace( slot, value )),
            None => { self.entries.push(( name, value )); None },
        }
    }

    pub fn get( &self, name: &str ) -> Option<&Value> {
        self.entries.iter().find(|( bound, _ )| bound == name ).map(|( _, value )| value )
    }

    pub fn contains( &self, name: &str ) -> bool { self.get( name ).is_some() }

    pub fn names( &self ) -> impl Iterator<Item = &str> { self.entries.iter().map(|( name, _ )| name.as_str() ) }

    pub fn len( &self ) -> usize { self.entries.len() }

    pub fn is_empty( &self ) -> bool { self.entries.is_empty() }

    /// Splits into the parameter list and the positional arguments.
    pub fn into_parts( self ) -> ( Vec<String>, Vec<Value> ) { self.entries.into_iter().unzip() }

}
