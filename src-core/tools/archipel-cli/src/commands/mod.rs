// Déclaration des modules disponibles dans le CLI
// Chaque module ici correspondra à un fichier .rs dans le même dossier

pub mod config;
pub mod run;
