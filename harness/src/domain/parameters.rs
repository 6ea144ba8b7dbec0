//! Positional statement parameters.

use serde::Serialize;
use serde_json::Value;

/// Ordered statement parameters in which nulls occupy an explicit slot.
///
/// ## Invariants
/// - The list has one slot per input value, in input order.
/// - A missing input value becomes [`Value::Null`]; slots are never skipped,
///   so `$n` placeholders keep lining up with their values.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ParameterList(Vec<Value>);

impl ParameterList {
    /// Number of slots.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list has no slots.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Value at `index` (zero based), if the slot exists.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    /// Whether the slot at `index` exists and holds null.
    pub fn is_null(&self, index: usize) -> bool {
        self.get(index).is_some_and(Value::is_null)
    }

    /// All slots in order.
    pub fn as_slice(&self) -> &[Value] {
        &self.0
    }

    /// Release the underlying values.
    pub fn into_inner(self) -> Vec<Value> {
        self.0
    }
}

impl<T> FromIterator<Option<T>> for ParameterList
where
    T: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = Option<T>>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|value| value.map_or(Value::Null, Into::into))
                .collect(),
        )
    }
}

/// Build a parameter list from optional values.
///
/// # Examples
/// ```
/// use tx_harness::domain::build_parameter_list;
///
/// let params = build_parameter_list([Some("ada"), None, Some("grace")]);
/// assert_eq!(params.len(), 3);
/// assert!(params.is_null(1));
/// ```
pub fn build_parameter_list<I, T>(values: I) -> ParameterList
where
    I: IntoIterator<Item = Option<T>>,
    T: Into<Value>,
{
    values.into_iter().collect()
}

#[cfg(test)]
mod tests {
    //! Regression coverage for parameter list construction.
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn keeps_order_and_null_slots() {
        let params = build_parameter_list([Some(1_i64), None, Some(3), None]);

        assert_eq!(params.as_slice(), [json!(1), Value::Null, json!(3), Value::Null]);
        assert!(!params.is_null(0));
        assert!(params.is_null(3));
        assert!(!params.is_null(4), "missing slots are not null slots");
    }

    #[rstest]
    fn all_null_input_keeps_every_slot() {
        let params = build_parameter_list::<_, String>([None, None]);

        assert_eq!(params.len(), 2);
        assert!(params.is_null(0) && params.is_null(1));
    }

    #[rstest]
    fn empty_input_gives_empty_list() {
        let params = build_parameter_list(Vec::<Option<bool>>::new());

        assert!(params.is_empty());
    }

    #[rstest]
    fn serialises_as_json_array() {
        let params = build_parameter_list([Some("open"), None]);

        assert_eq!(
            serde_json::to_value(&params).expect("serialise"),
            json!(["open", null])
        );
    }
}
