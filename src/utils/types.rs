/// Alias to a scalar floating type.
///
/// NOTE: metric values come from external evaluators which report `f64`, so there is
/// no value in making this generic.
pub type Float = f64;
