// Déclaration des sous-modules situés dans le dossier /genetics_suite/
mod common;

pub mod genetics_suite {
    pub mod engine_flow_test;
    pub mod island_flow_test;
    pub mod operator_contract_test;
}
