// Alert system: decides which events deserve a notification and renders them.
//
// Architecture:
// - model.rs: Alert record handed to the dispatch channels
// - format.rs: Per-category message templates
// - engine.rs: Alert window and duplicate suppression

pub mod engine;
pub mod format;
pub mod model;
