//! Budget selection: which elements of a literal survive.
//!
//! Selection is a prefix of the element list. Must-keep elements are admitted
//! unconditionally; nested literals that do not fit whole are trimmed recursively
//! to a proportional share of the spare budget instead of being dropped.

use std::collections::BTreeMap;

use log::trace;

use super::common::{line_indent, removed_summary};
use super::elements::{Element, ElementList, ElementParser, NestedRef};
use super::profile::{CollectionProfile, LanguageRegistry};
use super::structure::{parse_collection, ParsedLiteral};
use super::tokens::TokenService;

/// Count and token figures the summary estimates are sized for.
const SUMMARY_ESTIMATE_COUNT: usize = 99;
const SUMMARY_ESTIMATE_TOKENS: usize = 999;

// ============ Flat Selection ============

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub kept: Vec<usize>,
    pub removed: Vec<usize>,
    pub total_count: usize,
    pub tokens_kept: usize,
    pub tokens_removed: usize,
    /// Must-keep elements alone exceeded the budget.
    pub over_budget: bool,
}

impl Selection {
    pub fn kept_count(&self) -> usize {
        self.kept.len()
    }

    pub fn removed_count(&self) -> usize {
        self.removed.len()
    }

    pub fn is_trimmed(&self) -> bool {
        !self.removed.is_empty()
    }
}

/// Keep the longest prefix of `costs` that fits `budget`; the first `min_keep` always stay.
pub fn select_flat(costs: &[usize], budget: usize, min_keep: usize) -> Selection {
    let mut selection = Selection {
        total_count: costs.len(),
        ..Selection::default()
    };

    let mut stopped = false;
    for (idx, &cost) in costs.iter().enumerate() {
        let must_keep = idx < min_keep;
        if !stopped && (must_keep || selection.tokens_kept + cost <= budget) {
            selection.kept.push(idx);
            selection.tokens_kept += cost;
            if selection.tokens_kept > budget {
                selection.over_budget = true;
            }
        } else {
            stopped = true;
            selection.removed.push(idx);
            selection.tokens_removed += cost;
        }
    }
    selection
}

// ============ DFS Selection ============

/// A kept element whose nested literal was trimmed on its own budget.
#[derive(Debug, Clone)]
pub struct NestedSelection {
    /// Span of the nested literal inside the element text.
    pub offset: usize,
    pub len: usize,
    pub parsed: ParsedLiteral,
    /// Registry index of the nested literal's profile.
    pub profile: usize,
    pub elements: ElementList,
    pub selection: DfsSelection,
    /// Estimated tokens of the trimmed nested literal, its placeholder included.
    pub rendered_tokens: usize,
}

#[derive(Debug, Clone, Default)]
pub struct DfsSelection {
    pub selection: Selection,
    /// Element index to its recursive sub-selection.
    pub nested: BTreeMap<usize, NestedSelection>,
    /// Budget left after frame, placeholder and kept elements; negative when over budget.
    pub remaining_budget: isize,
}

impl DfsSelection {
    pub fn is_trimmed(&self) -> bool {
        self.selection.is_trimmed() || !self.nested.is_empty()
    }

    /// Total placeholders this selection renders, nested ones included.
    pub fn placeholder_count(&self) -> usize {
        let own = usize::from(self.selection.is_trimmed());
        own + self.nested.values().map(|n| n.selection.placeholder_count()).sum::<usize>()
    }
}

/// Cost of one kept element, with the nested trim that produced it when it is smaller than the whole.
#[derive(Debug, Clone)]
struct ElementForm {
    cost: usize,
    nested: Option<NestedSelection>,
}

impl ElementForm {
    fn whole(cost: usize) -> Self {
        Self { cost, nested: None }
    }
}

pub struct BudgetSelector<'a> {
    pub registry: &'a LanguageRegistry,
    pub tokens: &'a dyn TokenService,
    pub nested_floor: usize,
    pub max_depth: usize,
}

impl<'a> BudgetSelector<'a> {
    pub fn new(registry: &'a LanguageRegistry, tokens: &'a dyn TokenService, nested_floor: usize, max_depth: usize) -> Self {
        Self {
            registry,
            tokens,
            nested_floor,
            max_depth,
        }
    }

    /// Estimated cost of the placeholder a trimmed collection will carry.
    pub fn placeholder_cost(&self, profile: &CollectionProfile) -> usize {
        let comments = self.registry.comments();
        let element = profile
            .placeholder_element
            .map_or(0, |p| self.tokens.count_tokens(&format!("{}{} ", p, profile.separator)));
        let middle = comments
            .block_comment(&removed_summary(SUMMARY_ESTIMATE_COUNT, SUMMARY_ESTIMATE_TOKENS))
            .or_else(|| comments.line_comment(&removed_summary(SUMMARY_ESTIMATE_COUNT, SUMMARY_ESTIMATE_TOKENS)))
            .map_or(0, |c| self.tokens.count_tokens(&c));
        element.max(middle)
    }

    /// Choose which elements of `parsed` survive `budget`, recursing into nested literals.
    ///
    /// The kept prefix is the longest one that fits with every nested literal at its
    /// smallest trimmed form. Budget left over is then handed to those nested literals in
    /// proportion to their size. Both steps only grow with the budget, so a larger budget
    /// never keeps fewer tokens.
    pub fn select_dfs(
        &self,
        parsed: &ParsedLiteral,
        profile: &CollectionProfile,
        list: &ElementList,
        budget: usize,
        depth: usize,
    ) -> DfsSelection {
        let frame = parsed.frame_tokens(self.tokens);
        let gap = self.layout_cost(parsed, profile);
        let full_costs: Vec<usize> = list.elements.iter().map(|e| e.tokens + gap).collect();
        let total: usize = full_costs.iter().sum();

        if total + frame <= budget {
            let selection = Selection {
                kept: (0..list.len()).collect(),
                total_count: list.len(),
                tokens_kept: total,
                ..Selection::default()
            };
            return DfsSelection {
                selection,
                remaining_budget: (budget - total - frame) as isize,
                ..DfsSelection::default()
            };
        }

        let placeholder = self.placeholder_cost(profile);
        let reserve = budget as isize - (frame + placeholder) as isize;

        let mut forms: Vec<ElementForm> = Vec::new();
        let mut floor_total = 0usize;
        for (idx, element) in list.elements.iter().enumerate() {
            let form = self.fit_element(parsed, element, gap, 0, depth);
            if idx >= profile.min_elements && (floor_total + form.cost) as isize > reserve {
                break;
            }
            floor_total += form.cost;
            forms.push(form);
        }

        let mut spare = (reserve - floor_total as isize).max(0) as usize;
        let grants = Self::grant_spare(&forms, &full_costs, &mut spare);

        let mut result = DfsSelection {
            selection: Selection {
                total_count: list.len(),
                ..Selection::default()
            },
            ..DfsSelection::default()
        };
        let kept_len = forms.len();
        for (idx, form) in forms.into_iter().enumerate() {
            let form = if grants[idx] > 0 {
                self.fit_element(parsed, &list.elements[idx], gap, form.cost + grants[idx], depth)
            } else {
                form
            };
            trace!("kept element {} ({} tokens, depth {})", idx, form.cost, depth);
            result.selection.kept.push(idx);
            result.selection.tokens_kept += form.cost;
            if let Some(sub) = form.nested {
                result.nested.insert(idx, sub);
            }
        }
        for (idx, &cost) in full_costs.iter().enumerate().skip(kept_len) {
            result.selection.removed.push(idx);
            result.selection.tokens_removed += cost;
        }

        result.remaining_budget = reserve - result.selection.tokens_kept as isize;
        result.selection.over_budget = result.remaining_budget < 0;
        result
    }

    /// Split `spare` tokens over the trimmed nested elements in proportion to their full
    /// cost, then pass what capped elements could not use on to the others in order.
    fn grant_spare(forms: &[ElementForm], full_costs: &[usize], spare: &mut usize) -> Vec<usize> {
        let mut grants = vec![0usize; forms.len()];
        let growable: Vec<usize> = (0..forms.len()).filter(|&i| forms[i].nested.is_some()).collect();
        let mut unvisited: usize = growable.iter().map(|&i| full_costs[i]).sum();

        for &i in &growable {
            let need = full_costs[i] - forms[i].cost;
            let share = (*spare * full_costs[i]).checked_div(unvisited).unwrap_or(*spare);
            unvisited -= full_costs[i];
            grants[i] = share.min(need);
            *spare -= grants[i];
        }
        for &i in &growable {
            let extra = (full_costs[i] - forms[i].cost - grants[i]).min(*spare);
            grants[i] += extra;
            *spare -= extra;
        }
        grants
    }

    /// Separator plus line break and indent (or a space) laid out after each element.
    pub fn layout_cost(&self, parsed: &ParsedLiteral, profile: &CollectionProfile) -> usize {
        let gap = if parsed.multiline {
            format!("{}\n{}", profile.separator, parsed.element_indent)
        } else {
            format!("{} ", profile.separator)
        };
        self.tokens.count_tokens(&gap)
    }

    /// Largest form of `element` costing at most `target`; its smallest form when `target`
    /// is below that. Only nested literals have anything between smallest and whole.
    fn fit_element(&self, parent: &ParsedLiteral, element: &Element, gap: usize, target: usize, depth: usize) -> ElementForm {
        let full_cost = element.tokens + gap;
        if full_cost <= target {
            return ElementForm::whole(full_cost);
        }
        let Some(nref) = element.nested.filter(|_| depth < self.max_depth) else {
            return ElementForm::whole(full_cost);
        };
        let Some(text) = element.text.get(nref.offset..nref.offset + nref.len) else {
            return ElementForm::whole(full_cost);
        };

        let overhead = element.tokens.saturating_sub(self.tokens.count_tokens(text));
        let budget = target.saturating_sub(overhead + gap).max(self.nested_floor);
        match self.trim_nested(parent, element, nref, budget, depth + 1) {
            Some(sub) => {
                let cost = self.element_cost(element, &sub) + gap;
                if cost < full_cost {
                    ElementForm { cost, nested: Some(sub) }
                } else {
                    ElementForm::whole(full_cost)
                }
            }
            None => ElementForm::whole(full_cost),
        }
    }

    /// Element cost once its nested literal is replaced by the trimmed rendering.
    fn element_cost(&self, element: &Element, sub: &NestedSelection) -> usize {
        let nested_original = sub.parsed.original_tokens;
        element.tokens.saturating_sub(nested_original) + sub.rendered_tokens
    }

    fn trim_nested(
        &self,
        parent: &ParsedLiteral,
        element: &Element,
        nref: NestedRef,
        budget: usize,
        depth: usize,
    ) -> Option<NestedSelection> {
        let profile = self.registry.profiles.get(nref.profile)?.collection()?;
        let text = element.text.get(nref.offset..nref.offset + nref.len)?;

        let base_indent = if element.text[..nref.offset].contains('\n') {
            line_indent(&element.text, nref.offset).to_string()
        } else {
            parent.element_indent.clone()
        };

        let parsed = parse_collection(
            text,
            0..nref.len,
            &base_indent,
            profile,
            &self.registry.lexical,
            self.registry.indent_unit,
            self.tokens,
        )
        .ok()?;
        let elements = ElementParser::new(self.registry, self.tokens).parse(&parsed.content, profile, depth);
        if elements.is_empty() {
            return None;
        }

        let selection = self.select_dfs(&parsed, profile, &elements, budget, depth);
        if !selection.is_trimmed() {
            return None;
        }

        // the placeholder stays reserved even when only deeper literals were trimmed
        let rendered_tokens =
            parsed.frame_tokens(self.tokens) + selection.selection.tokens_kept + self.placeholder_cost(profile);

        Some(NestedSelection {
            offset: nref.offset,
            len: nref.len,
            parsed,
            profile: nref.profile,
            elements,
            selection,
            rendered_tokens,
        })
    }
}
