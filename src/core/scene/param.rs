//=========================================================================
// Scene Parameters
//=========================================================================
//
// Type-tagged payload carried by a change request to the incoming
// scene's typed entry point.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::any::{type_name, Any};
use std::fmt;

//=== Internal Dependencies ===============================================

use crate::error::ParamError;

//=== SceneParam ==========================================================

/// A boxed value plus the name of its concrete type.
///
/// Handlers match on the type with [`SceneParam::is`] or take the value
/// with [`SceneParam::downcast`]; a mismatch is an ordinary error, not a
/// panic.
pub struct SceneParam {
    type_name: &'static str,
    value: Box<dyn Any + Send>,
}

impl SceneParam {
    pub fn new<T: Any + Send>(value: T) -> Self {
        Self {
            type_name: type_name::<T>(),
            value: Box::new(value),
        }
    }

    /// Name of the carried value's type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns `true` if the carried value is a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    /// Borrows the carried value as a `T`.
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Takes the carried value as a `T`.
    pub fn downcast<T: Any>(self) -> Result<T, ParamError> {
        let found = self.type_name;

        self.value
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|_| ParamError::TypeMismatch {
                expected: type_name::<T>(),
                found,
            })
    }
}

impl fmt::Debug for SceneParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneParam")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
