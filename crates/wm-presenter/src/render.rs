//! `Display`-based type rendering (spec §4.5, grounded on
//! `tsz-checker`'s `format_type`/`error_reporter::type_value` pattern: walk
//! the arena recursively, special-casing the shapes that need custom
//! surface syntax instead of the Haskell-ish structural default).
//!
//! The one shape that gets special treatment is the *infection
//! pretty-printer* rule (spec §4.5): a two-argument constructor registered
//! with the infection registry, whose second argument is a non-trivial
//! effect row, renders as `⚡value <row>` instead of `Name<value, row>`.

use ena::unify::UnifyKey;
use wm_infection::InfectionRegistry;
use wm_types::{TyVar, TypeArena, TypeData, TypeId};

/// Renders `id` the way a hover tooltip would show it: infection sugar
/// applied, row labels joined with `|`, quantified variables left as plain
/// greek-style names (callers wanting a scheme's `∀` prefix use
/// [`render_scheme`]).
pub fn render_type(arena: &mut TypeArena, infection: &InfectionRegistry, id: TypeId) -> String {
    let id = arena.substitute(id);
    render(arena, infection, id)
}

fn render(arena: &mut TypeArena, infection: &InfectionRegistry, id: TypeId) -> String {
    match arena.get(id).clone() {
        TypeData::Unit => "Unit".to_string(),
        TypeData::Int => "Int".to_string(),
        TypeData::Bool => "Bool".to_string(),
        TypeData::Char => "Char".to_string(),
        TypeData::String => "String".to_string(),
        TypeData::Var(v) => var_name(v),
        TypeData::Unknown { .. } => "?".to_string(),
        TypeData::Func { from, to } => {
            let from_str = render(arena, infection, from);
            let wrapped = if matches!(arena.get(from), TypeData::Func { .. }) {
                format!("({from_str})")
            } else {
                from_str
            };
            format!("{wrapped} -> {}", render(arena, infection, to))
        }
        TypeData::Tuple(elements) => {
            let rendered: Vec<String> = elements.iter().map(|e| render(arena, infection, *e)).collect();
            format!("({})", rendered.join(", "))
        }
        TypeData::Record(fields) => {
            let rendered: Vec<String> =
                fields.iter().map(|(name, ty)| format!("{name}: {}", render(arena, infection, *ty))).collect();
            format!("{{ {} }}", rendered.join(", "))
        }
        TypeData::Constructor { name, args } => render_constructor(arena, infection, &name, &args),
        TypeData::Array { length, element } => format!("[{}; {length}]", render(arena, infection, element)),
        TypeData::EffectRow { cases, tail, has_tail_wildcard } => render_row(arena, infection, &cases, tail, has_tail_wildcard),
    }
}

fn render_constructor(arena: &mut TypeArena, infection: &InfectionRegistry, name: &str, args: &[TypeId]) -> String {
    if args.len() == 2 && infection.lookup(name).is_some() {
        if let Some(row_id) = non_trivial_row(arena, args[1]) {
            let value = render(arena, infection, args[0]);
            let row = render(arena, infection, row_id);
            return format!("\u{26a1}{value} {row}");
        }
    }
    if args.is_empty() {
        return name.to_string();
    }
    let rendered: Vec<String> = args.iter().map(|a| render(arena, infection, *a)).collect();
    format!("{name}<{}>", rendered.join(", "))
}

/// Returns `Some(row)` when `id` resolves to an [`TypeData::EffectRow`] that
/// carries at least one label or an open tail — the "non-trivial" case the
/// infection pretty-printer rule calls out. A row with neither (fully
/// discharged, closed) isn't worth the `⚡` sugar.
fn non_trivial_row(arena: &mut TypeArena, id: TypeId) -> Option<TypeId> {
    let resolved = arena.substitute(id);
    match arena.get(resolved) {
        TypeData::EffectRow { cases, tail, .. } if !cases.is_empty() || tail.is_some() => Some(resolved),
        _ => None,
    }
}

fn render_row(
    arena: &mut TypeArena,
    infection: &InfectionRegistry,
    cases: &indexmap::IndexMap<String, Option<TypeId>>,
    tail: Option<TypeId>,
    has_tail_wildcard: bool,
) -> String {
    let mut labels: Vec<String> = cases
        .iter()
        .map(|(label, payload)| match payload {
            Some(ty) => format!("{label}({})", render(arena, infection, *ty)),
            None => label.clone(),
        })
        .collect();
    if let Some(tail_id) = tail {
        labels.push(format!("..{}", render(arena, infection, tail_id)));
    } else if has_tail_wildcard {
        labels.push("..".to_string());
    }
    format!("<{}>", labels.join(" | "))
}

fn var_name(v: TyVar) -> String {
    const ALPHABET: &[char] = &['\u{3b1}', '\u{3b2}', '\u{3b3}', '\u{3b4}', '\u{3b5}', '\u{3b6}', '\u{3b7}', '\u{3b8}'];
    let index = v.index() as usize;
    if index < ALPHABET.len() {
        ALPHABET[index].to_string()
    } else {
        format!("t{index}")
    }
}

/// Renders a generalized [`wm_types::Scheme`] with its `∀`-prefix (spec §8's
/// "Polymorphic identity" scenario expects `∀α. α→α`).
pub fn render_scheme(arena: &mut TypeArena, infection: &InfectionRegistry, scheme: &wm_types::Scheme) -> String {
    let body = render_type(arena, infection, scheme.ty);
    if scheme.quantifiers.is_empty() {
        return body;
    }
    let names: Vec<String> = scheme.quantifiers.iter().map(|v| var_name(*v)).collect();
    format!("\u{2200}{}. {body}", names.join(" "))
}
