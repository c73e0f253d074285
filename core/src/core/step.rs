// orderflow/src/core/step.rs

/// Definition of a single named pipeline step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepDef {
  pub name: String,
  /// An optional step without a registered handler is skipped instead of
  /// failing the run.
  pub optional: bool,
}
