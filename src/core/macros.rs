//! Macro for declaring ordered lifecycle phase enums.

/// Declare a fieldless enum whose variants are ordered lifecycle phases.
///
/// Generates the enum (with `Copy`, `Eq`, `Hash` and serde derives), its
/// `State` implementation, an `ALL` constant listing the variants in
/// declaration order and an `ordinal` accessor giving each variant's index
/// in that order.
///
/// # Example
///
/// ```
/// use wordtally::phase_enum;
/// use wordtally::core::State;
///
/// phase_enum! {
///     pub enum LoadPhase {
///         Start,
///         Loading,
///         Done,
///         Broken,
///     }
///     final: [Done]
///     error: [Broken]
/// }
///
/// assert_eq!(LoadPhase::ALL.len(), 4);
/// assert_eq!(LoadPhase::Loading.ordinal(), 1);
/// assert!(LoadPhase::Done.is_final());
/// assert!(LoadPhase::Broken.is_error());
/// ```
#[macro_export]
macro_rules! phase_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }

        $(final: [$($final:ident),* $(,)?])?
        $(error: [$($error:ident),* $(,)?])?
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $name {
            /// Every phase in declaration order.
            pub const ALL: &'static [$name] = &[$(Self::$variant),*];

            /// Position of this phase in declaration order.
            pub fn ordinal(&self) -> usize {
                Self::ALL
                    .iter()
                    .position(|phase| phase == self)
                    .unwrap_or(Self::ALL.len())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str($crate::core::State::name(self))
            }
        }

        impl $crate::core::State for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }

            fn is_final(&self) -> bool {
                match self {
                    $($(Self::$final => true,)*)?
                    #[allow(unreachable_patterns)]
                    _ => false,
                }
            }

            fn is_error(&self) -> bool {
                match self {
                    $($(Self::$error => true,)*)?
                    #[allow(unreachable_patterns)]
                    _ => false,
                }
            }
        }
    };
}
