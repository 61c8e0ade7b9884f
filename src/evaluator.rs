//! Module body execution.

use crate::loader::LoadWarning ;
use crate::parser::ImportBinding ;
use crate::plugins::{ LoaderApi, Plugins };
use crate::registry::{ Module, Registry };
use crate::script::{ Bindings, Object, RuntimeError, Value };
use crate::utils::PartialSuccess ;



/// Runs the body of `module` once and returns its exports.
///
/// The scope holds, in order: every dependency binding, `module` (an object whose
/// `exports` property is the export container) and `exports` (the container
/// itself), followed by whatever the deps plugins add. Whatever `module.exports`
/// refers to once the body returns is the module's export object; a non-object
/// value is wrapped as its `default` property.
///
/// The caller guarantees every dependency is initialized. A dependency that has no
/// exports binds as an empty object.
///
/// # Errors
/// Returns the [`RuntimeError`] the body stopped at. Nothing is exported then.
pub(crate) fn evaluate(
    module: &Module,
    registry: &Registry,
    plugins: &Plugins,
) -> Result<PartialSuccess<Object, LoadWarning>, RuntimeError> {

    let mut bindings = Bindings::new();
    let mut warnings = Vec::new();

    for dependency in module.deps().unwrap_or_default() {
        let exports = registry.get( &dependency.path )
            .and_then( Module::exports )
            .cloned()
            .unwrap_or_default();
        match &dependency.binding {
            ImportBinding::Whole( name ) => { bindings.insert( name.as_str(), Value::Object( exports )); },
            ImportBinding::Named( names ) => for name in names.nonempty_iter() {
                bindings.insert( name.local.as_str(), exports.get( &name.imported ));
            },
            ImportBinding::SideEffect => {},
        }
    }

    let container = Object::new();
    let handle = Object::from_iter([( "exports", Value::Object( container.clone() ))]);
    bindings.insert( "module", Value::Object( handle.clone() ));
    bindings.insert( "exports", Value::Object( container ));

    plugins.inject( &LoaderApi::new( registry, plugins ), module.path(), &mut bindings );

    let Some( script ) = module.script() else { return Ok(( Object::new(), warnings )) };
    script.unit().call( bindings )?;

    let exports = match handle.get( "exports" ) {
        Value::Object( exports ) => exports,
        Value::Undefined | Value::Null => Object::new(),
        other => {
            warnings.push( LoadWarning::NonObjectExports( module.name().to_string() ));
            Object::from_iter([( "default", other )])
        },
    };

    if module.is_injectable() && exports.is_empty() {
        warnings.push( LoadWarning::MissingExports( module.name().to_string() ));
    }

    Ok(( exports, warnings ))

}
