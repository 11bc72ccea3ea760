//! Macros for ergonomic state declarations.

/// Declare a simple enum usable as a machine state.
///
/// Derives the traits every state needs and adds `name()` plus an `ALL`
/// constant listing the variants in declaration order.
///
/// # Example
///
/// ```
/// use statetree::state_enum;
///
/// state_enum! {
///     pub enum Stance {
///         Idle,
///         Move,
///         Walk,
///     }
/// }
///
/// assert_eq!(Stance::Walk.name(), "Walk");
/// assert_eq!(Stance::ALL.len(), 3);
/// ```
#[macro_export]
macro_rules! state_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $name {
            /// Every variant, in declaration order.
            #[allow(dead_code)]
            pub const ALL: &'static [$name] = &[$(Self::$variant),*];

            /// The variant's name for display/logging.
            #[allow(dead_code)]
            pub fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}
