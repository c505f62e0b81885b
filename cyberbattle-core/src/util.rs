//! Utilities.

/// Returns the name of a type without module path and generic parameters.
pub fn short_type_name<T: ?Sized>() -> String {
    let name = std::any::type_name::<T>();
    let name = name.split('<').next().unwrap_or(name);
    name.rsplit("::").next().unwrap_or(name).to_string()
}

/// Mean of the last `window` values, or of all values if `window` is 0.
///
/// Returns `NaN` for an empty slice.
pub fn mean_over_window(values: &[f32], window: usize) -> f32 {
    let start = match window {
        0 => 0,
        w => values.len().saturating_sub(w),
    };
    let tail = &values[start..];
    tail.iter().sum::<f32>() / tail.len() as f32
}
