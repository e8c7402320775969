/// Configuration macros for zero-repetition config definitions
///
/// `config_struct!` defines a configuration struct with its defaults embedded
/// next to each field and generates:
/// - The struct with public fields
/// - The `Default` implementation with the specified values
/// - Serde support with `#[serde(default)]`, so partial TOML files work
///
/// ```rust,ignore
/// config_struct! {
///     pub struct SubgraphConfig {
///         timeout_secs: u64 = 15,
///         subgraph_id: String = String::new(),
///     }
/// }
/// ```
#[macro_export]
macro_rules! config_struct {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_name:ident: $field_type:ty = $default_value:expr
            ),*
            $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
        #[serde(default)]
        $vis struct $name {
            $(
                $(#[$field_meta])*
                pub $field_name: $field_type,
            )*
        }

        impl Default for $name {
            fn default() -> Self {
                Self {
                    $(
                        $field_name: $default_value,
                    )*
                }
            }
        }
    };
}
