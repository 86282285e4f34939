#[macro_export]
macro_rules! regex {
    ($pat:literal) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).unwrap());
        &*RE
    }};
}

/// Declare a [`FilterDef`](crate::FilterDef) in one expression.
///
/// ```
/// use flexvars::{FlexVars, filter};
///
/// let mut vars = FlexVars::new();
/// vars.add_filter(filter! {
///     name: "add",
///     args: ["step"],
///     default: { "step": 1 },
///     next: |value, args, _ctx| {
///         let n = flexvars::value::as_number(value).unwrap_or(0.0);
///         Ok((n + args.get_f64("step").unwrap_or(1.0)).into())
///     },
/// })
/// .unwrap();
///
/// assert_eq!(vars.replace("{|add(2)|add}", 0).unwrap(), "3");
/// ```
#[macro_export]
macro_rules! filter {
    (
        name: $name:expr
        $(, priority: $priority:expr)?
        $(, args: [ $($arg:expr),* $(,)? ])?
        $(, default: $default:tt)?
        $(, config_key: $config_key:expr)?
        , next: $next:expr
        $(,)?
    ) => {{
        #[allow(unused_mut)]
        let mut def = $crate::FilterDef::new($name, $next);
        $(def.priority = $priority;)?
        $(def.args = Some(vec![ $(::std::string::String::from($arg)),* ]);)?
        $(def.defaults = $crate::Defaults::from_value($crate::serde_json::json!($default));)?
        $(def.config_key = Some(::std::string::String::from($config_key));)?
        def
    }};
}
