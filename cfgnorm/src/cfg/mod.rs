pub mod cfg;
pub mod derivation;
pub mod epsilon;
pub mod normal_form;
pub mod production;
pub mod terminal;
pub mod text;
pub mod unit;
pub mod useless;
pub mod variable;
