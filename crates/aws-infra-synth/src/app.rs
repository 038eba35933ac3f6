//! The app: every stack of one construction pass
//!
//! Stacks are kept in insertion order. Deployment order is derived from the
//! dependencies recorded by cross-stack imports.

use crate::constructs::Stack;
use aws_infra_common::PolicyError;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Default)]
pub struct App {
    stacks: Vec<Stack>,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a stack, rejecting a second stack with the same deployable name
    pub fn add_stack(&mut self, stack: Stack) -> Result<(), PolicyError> {
        if self
            .stacks
            .iter()
            .any(|s| s.stack_name() == stack.stack_name())
        {
            return Err(PolicyError::DuplicateStack(stack.stack_name().to_string()));
        }
        self.stacks.push(stack);
        Ok(())
    }

    /// Look up a stack by id, unit name or deployable name
    pub fn stack(&self, name: &str) -> Result<&Stack, PolicyError> {
        self.stacks
            .iter()
            .find(|s| s.is_named(name))
            .ok_or_else(|| PolicyError::UnknownStack(name.to_string()))
    }

    pub fn stack_mut(&mut self, name: &str) -> Result<&mut Stack, PolicyError> {
        self.stacks
            .iter_mut()
            .find(|s| s.is_named(name))
            .ok_or_else(|| PolicyError::UnknownStack(name.to_string()))
    }

    pub fn stacks(&self) -> &[Stack] {
        &self.stacks
    }

    /// Total number of resources across all stacks
    pub fn resource_count(&self) -> usize {
        self.stacks.iter().map(|s| s.resources().len()).sum()
    }

    /// Stacks ordered so that every stack comes after the stacks it imports
    /// from. Ties keep insertion order.
    pub fn deployment_order(&self) -> Result<Vec<&Stack>, PolicyError> {
        let index: BTreeMap<&str, usize> = self
            .stacks
            .iter()
            .enumerate()
            .map(|(i, s)| (s.stack_name(), i))
            .collect();

        let mut pending: Vec<usize> = vec![0; self.stacks.len()];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); self.stacks.len()];
        for (i, stack) in self.stacks.iter().enumerate() {
            for dependency in stack.dependencies() {
                let &d = index
                    .get(dependency.as_str())
                    .ok_or_else(|| PolicyError::UnknownStack(dependency.clone()))?;
                pending[i] += 1;
                dependents[d].push(i);
            }
        }

        // Smallest insertion index first keeps the order stable.
        let mut ready: BTreeSet<usize> = (0..self.stacks.len())
            .filter(|&i| pending[i] == 0)
            .collect();
        let mut order = Vec::with_capacity(self.stacks.len());
        while let Some(i) = ready.pop_first() {
            order.push(&self.stacks[i]);
            for &j in &dependents[i] {
                pending[j] -= 1;
                if pending[j] == 0 {
                    ready.insert(j);
                }
            }
        }

        if order.len() != self.stacks.len() {
            let stuck = self
                .stacks
                .iter()
                .enumerate()
                .find(|(i, _)| pending[*i] > 0)
                .map(|(_, s)| s.stack_name().to_string())
                .unwrap_or_default();
            return Err(PolicyError::DependencyCycle(stuck));
        }
        Ok(order)
    }

    /// Deployable names of `names` plus everything they depend on
    pub fn select(&self, names: &[String]) -> Result<BTreeSet<String>, PolicyError> {
        let mut selected = BTreeSet::new();
        let mut queue: Vec<String> = Vec::new();
        for name in names {
            queue.push(self.stack(name)?.stack_name().to_string());
        }
        while let Some(name) = queue.pop() {
            if !selected.insert(name.clone()) {
                continue;
            }
            let stack = self.stack(&name)?;
            queue.extend(stack.dependencies().iter().cloned());
        }
        Ok(selected)
    }
}
