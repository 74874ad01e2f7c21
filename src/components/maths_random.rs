//! Willekeurige gehele getallen zonder opeenvolgende herhalingen.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::graph::meta::MetaMap;
use crate::graph::value::{Domain1D, Value};

use super::coerce::{coerce_count_or, coerce_domain_or, coerce_integer, provided};
use super::{Component, ComponentError, ComponentResult};

const PIN_OUTPUT_NUMBERS: &str = "N";

const DEFAULT_RANGE: Domain1D = Domain1D::new(0.0, 10.0);
const DEFAULT_COUNT: usize = 100;
const DEFAULT_SEED: i64 = 666;
/// Bovengrens voor het aantal getallen per evaluatie.
const MAX_COUNT: usize = 1_000_000;

/// Beschikbare componenten binnen Maths → Random.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    RandomNoRepeat,
}

/// Metadata voor registraties in de componentregistry.
#[derive(Debug, Clone, Copy)]
pub struct Registration {
    pub guids: &'static [&'static str],
    pub names: &'static [&'static str],
    pub kind: ComponentKind,
}

/// Registraties van alle Maths → Random componenten.
pub const REGISTRATIONS: &[Registration] = &[Registration {
    guids: &["{c4024aa1-9a7b-4a3d-9c56-08a41e7744cb}"],
    names: &["NonConsecutive Random", "RndNoRpt"],
    kind: ComponentKind::RandomNoRepeat,
}];

impl Component for ComponentKind {
    fn evaluate(&self, inputs: &[Value], _meta: &MetaMap) -> ComponentResult {
        match self {
            Self::RandomNoRepeat => evaluate_random_no_repeat(inputs, self.name()),
        }
    }
}

impl ComponentKind {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::RandomNoRepeat => "NonConsecutive Random",
        }
    }
}

fn evaluate_random_no_repeat(inputs: &[Value], component: &str) -> ComponentResult {
    let range = coerce_domain_or(inputs.first(), DEFAULT_RANGE)?;
    let count = coerce_count_or(inputs.get(1), DEFAULT_COUNT, &format!("{component} N"))?;
    let seed = provided(inputs.get(2)).map_or(Ok(DEFAULT_SEED), coerce_integer)?;

    if range.start.partial_cmp(&range.end) != Some(Ordering::Less) || count == 0 {
        return Err(ComponentError::new(format!(
            "{component}: het domein moet minstens lengte 1 hebben en het aantal moet groter dan 0 zijn"
        )));
    }
    if count > MAX_COUNT {
        return Err(ComponentError::new(format!(
            "{component}: maximaal {MAX_COUNT} getallen, kreeg {count}"
        )));
    }

    #[allow(clippy::cast_possible_truncation)]
    let (low, high) = (range.start.trunc() as i64, range.end.trunc() as i64);
    if low >= high {
        return Err(ComponentError::new(format!(
            "{component}: het domein {} .. {} bevat maar één geheel getal",
            range.start, range.end
        )));
    }

    #[allow(clippy::cast_sign_loss)]
    let mut rng = StdRng::seed_from_u64(seed as u64);
    let numbers = if (range.length() - 1.0).abs() < f64::EPSILON {
        log::info!("{component}: domein van lengte 1, opeenvolgende herhalingen zijn mogelijk");
        (0..count).map(|_| rng.random_range(low..=high)).collect()
    } else {
        non_repeating(&mut rng, low, high, count)
    };

    #[allow(clippy::cast_precision_loss)]
    let values = numbers.into_iter().map(|n: i64| Value::Number(n as f64)).collect();

    let mut outputs = BTreeMap::new();
    outputs.insert(PIN_OUTPUT_NUMBERS.to_owned(), Value::List(values));
    Ok(outputs)
}

/// Trekt `count` getallen uit `low..=high` waarbij geen getal direct op
/// zichzelf volgt. Na de eerste trekking wordt uit de overige waarden gekozen.
fn non_repeating(rng: &mut StdRng, low: i64, high: i64, count: usize) -> Vec<i64> {
    let mut numbers = Vec::with_capacity(count);
    let mut previous: Option<i64> = None;
    for _ in 0..count {
        let number = match previous {
            None => rng.random_range(low..=high),
            Some(previous) => {
                let candidate = rng.random_range(low..high);
                if candidate >= previous {
                    candidate + 1
                } else {
                    candidate
                }
            }
        };
        numbers.push(number);
        previous = Some(number);
    }
    numbers
}
