use std::env;

use serde::Serialize;

use crate::character::{Character, ProficiencyAssociation};
use crate::context::{AlwaysPass, Entity, LoadContext};
use crate::data::catalog::{load_catalog, CapabilityRegistry, DEFAULT_CATALOG_PATH};
use crate::data::ruleset::{compile_rule_set, load_rule_set};
use crate::data::validate::validate_rule_set;
use crate::token::{apply_choices, granted_capabilities, SHIELD_PROF};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Decode,
    Validate,
    Grant,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("decode") => Some(Command::Decode),
        Some("validate") => Some(Command::Validate),
        Some("grant") => Some(Command::Grant),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    match parse_command(args) {
        Some(Command::Decode) => handle_decode(args),
        Some(Command::Validate) => handle_validate(args),
        Some(Command::Grant) => handle_grant(args),
        None => {
            eprintln!("usage: autoprof <decode|validate|grant>");
            2
        }
    }
}

#[derive(Debug, Serialize)]
struct DecodeOutput {
    token: String,
    values: Vec<String>,
}

#[derive(Debug, Serialize)]
struct GrantOutput<'a> {
    entity: &'a str,
    granted: Vec<&'a str>,
}

/// Catalog path from `AUTOPROF_CATALOG`, falling back to the bundled default.
fn catalog_path() -> String {
    env::var("AUTOPROF_CATALOG").unwrap_or_else(|_| DEFAULT_CATALOG_PATH.to_string())
}

fn print_json<T: Serialize>(value: &T) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize output: {err}");
            1
        }
    }
}

fn handle_decode(args: &[String]) -> i32 {
    let values = &args[2.min(args.len())..];
    if values.is_empty() {
        eprintln!("usage: autoprof decode <value>...");
        return 2;
    }

    let mut ctx = LoadContext::new();
    let mut entity = Entity::new("cli");
    for value in values {
        if let Err(err) = SHIELD_PROF.decode(&mut ctx, &mut entity, value) {
            eprintln!("decode failed: {err}");
            return 1;
        }
    }

    match SHIELD_PROF.try_encode(&ctx, &entity) {
        Ok(values) => print_json(&DecodeOutput {
            token: SHIELD_PROF.full_name(),
            values: values.unwrap_or_default(),
        }),
        Err(err) => {
            eprintln!("encode failed: {err}");
            1
        }
    }
}

fn handle_validate(args: &[String]) -> i32 {
    let Some(path) = args.get(2) else {
        eprintln!("usage: autoprof validate <rules.yaml> [catalog.yaml]");
        return 2;
    };

    let file = match load_rule_set(path) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("validation failed: {err}");
            return 1;
        }
    };

    // Without an explicit catalog only AUTOPROF_CATALOG is consulted.
    let catalog = args
        .get(3)
        .cloned()
        .or_else(|| env::var("AUTOPROF_CATALOG").ok());
    let registry = match catalog.as_deref().map(|p| load_catalog(p)).transpose() {
        Ok(registry) => registry,
        Err(err) => {
            eprintln!("validation failed: {err}");
            return 1;
        }
    };

    let report = validate_rule_set(&file, registry.as_ref());
    if report.has_errors() {
        eprintln!("validation failed: {} error(s)", report.error_count());
        for diag in &report.diagnostics {
            eprintln!("- {diag}");
        }
        return 1;
    }

    for diag in &report.diagnostics {
        eprintln!("- {diag}");
    }
    println!("validation passed: {path}");
    0
}

fn handle_grant(args: &[String]) -> i32 {
    let (Some(path), Some(key)) = (args.get(2), args.get(3)) else {
        eprintln!("usage: autoprof grant <rules.yaml> <entity-key> [choice]...");
        return 2;
    };
    let choices = &args[4.min(args.len())..];

    let file = match load_rule_set(path) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("grant failed: {err}");
            return 1;
        }
    };
    let registry = match load_catalog(catalog_path()) {
        Ok(registry) => registry,
        Err(err) => {
            eprintln!("grant failed: {err}");
            return 1;
        }
    };

    let mut ctx = LoadContext::new();
    let compiled = compile_rule_set(&mut ctx, &file);
    for diag in &ctx.report.diagnostics {
        eprintln!("- {diag}");
    }
    let Some(entity) = compiled.entity(key) else {
        eprintln!("grant failed: unknown entity '{key}'");
        return 1;
    };
    ctx.refs.finalize(&registry);

    let character = grant_to_character(entity, &ctx, &registry, choices);
    let granted = character
        .capability_ids()
        .into_iter()
        .filter_map(|id| registry.name_of(id))
        .collect();
    print_json(&GrantOutput {
        entity: entity.key(),
        granted,
    })
}

/// Fresh character holding the entity's static grants plus the chosen names.
/// Conditions cannot be evaluated from the command line, so all of them pass.
fn grant_to_character(
    entity: &Entity,
    ctx: &LoadContext,
    registry: &CapabilityRegistry,
    choices: &[String],
) -> Character {
    let mut character = Character::new(entity.key());
    for id in granted_capabilities(entity, &SHIELD_PROF, &ctx.refs, &AlwaysPass, &character) {
        character.add_assoc(entity.key(), ProficiencyAssociation::Single(id));
    }
    apply_choices(
        entity,
        &SHIELD_PROF,
        &mut character,
        registry,
        &AlwaysPass,
        choices,
    );
    character
}
