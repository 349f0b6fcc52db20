use std::borrow::Cow;
use std::default::Default;
use std::fmt::{Display, Formatter};
use std::io::{self, BufWriter, Write};

use itertools::Itertools;
use ptree::print_config::UTF_CHARS;
use ptree::{write_tree_with, PrintConfig, Style, TreeItem};
use strum_macros::AsRefStr;

use crate::cost::Cost;
use crate::dp::{JoinPlan, JoinStep};
use crate::query::QuerySpec;

/// Operator shown on one line of an explained plan.
#[derive(Clone, Debug, AsRefStr)]
enum ExplainOperator {
    Empty,
    Scan { relation: String, rows: u64 },
    Join { on: String, cost: Cost },
    CrossJoin { cost: Cost },
}

impl Display for ExplainOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_ref())?;
        match self {
            ExplainOperator::Empty => Ok(()),
            ExplainOperator::Scan { relation, rows } => f
                .debug_struct("")
                .field("relation", relation)
                .field("rows", rows)
                .finish(),
            ExplainOperator::Join { on, cost } => f
                .debug_struct("")
                .field("on", &format_args!("{}", on))
                .field("cost", &format_args!("{}", cost))
                .finish(),
            ExplainOperator::CrossJoin { cost } => f
                .debug_struct("")
                .field("cost", &format_args!("{}", cost))
                .finish(),
        }
    }
}

#[derive(Clone, Debug)]
struct ExplainNode {
    operator: ExplainOperator,
    inputs: Vec<ExplainNode>,
}

impl TreeItem for ExplainNode {
    type Child = Self;

    fn write_self<W: Write>(&self, f: &mut W, style: &Style) -> io::Result<()> {
        write!(f, "{}", style.paint(&self.operator))
    }

    fn children(&self) -> Cow<[Self::Child]> {
        Cow::from(&self.inputs[..])
    }
}

impl ExplainNode {
    fn scan(query: &QuerySpec, step: &JoinStep) -> Self {
        let relation = query.relation(step.relation());
        Self {
            operator: ExplainOperator::Scan {
                relation: relation.name().to_string(),
                rows: relation.estimated_rows(),
            },
            inputs: vec![],
        }
    }

    /// Left deep tree, the last joined relation is the right input of the root.
    fn from_plan(query: &QuerySpec, plan: &JoinPlan) -> Self {
        let steps = match plan {
            JoinPlan::Empty => {
                return Self {
                    operator: ExplainOperator::Empty,
                    inputs: vec![],
                }
            }
            JoinPlan::Joined(fragment) => fragment.steps(),
        };

        let (first, rest) = match steps.split_first() {
            Some(split) => split,
            None => {
                return Self {
                    operator: ExplainOperator::Empty,
                    inputs: vec![],
                }
            }
        };

        rest.iter()
            .fold(Self::scan(query, first), |left, step| {
                let operator = if step.predicates().is_empty() {
                    ExplainOperator::CrossJoin { cost: step.cost() }
                } else {
                    ExplainOperator::Join {
                        on: step
                            .predicates()
                            .iter()
                            .map(|id| query.predicate(*id))
                            .join(" AND "),
                        cost: step.cost(),
                    }
                };
                Self {
                    operator,
                    inputs: vec![left, Self::scan(query, step)],
                }
            })
    }
}

pub fn explain<W: Write>(query: &QuerySpec, plan: &JoinPlan, output: &mut W) -> io::Result<()> {
    let config = PrintConfig {
        indent: 3,
        characters: UTF_CHARS.into(),
        ..Default::default()
    };
    write_tree_with(&ExplainNode::from_plan(query, plan), output, &config)
}

pub fn explain_to_string(query: &QuerySpec, plan: &JoinPlan) -> io::Result<String> {
    let mut buf = BufWriter::new(Vec::new());

    explain(query, plan, &mut buf)?;

    let bytes = buf.into_inner()?;
    String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
