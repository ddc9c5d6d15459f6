//! The flow sub-language: entry chains and when-blocks.
//!
//! ```text
//! Customer "places an order" -> PlaceOrder -> OrderService -> OrderCreated
//!
//! when PaymentAuthorized and StockReserved
//!   OrderService "confirms"
//!     -> "success": OrderConfirmed
//!     -> "failure": OrderRejected
//!   Notifier
//! ```
//!
//! Actions of a when-block run until the next `when`, the closing `}` or
//! any other flow-level statement. After the first action, a line that
//! starts at or left of the `when` keyword's column ends the block, so an
//! entry chain can follow a when-block.

use super::{PResult, Parser};
use crate::ast::{
    kinds, ChainNode, FlowAction, FlowEntryChain, FlowOutput, FlowWhenBlock, TriggerJoin,
};
use crate::lexer::Token;

/// Words that start a flow-level statement rather than an action.
pub(crate) const FLOW_STATEMENT_WORDS: &[&str] = &[
    "when",
    "version",
    "name",
    "summary",
    "owner",
    "draft",
    "deprecated",
];

impl<'a> Parser<'a> {
    pub(super) fn parse_entry_chain(&mut self) -> PResult<FlowEntryChain> {
        let start = self.cur_span();
        let mut nodes = vec![self.parse_chain_node()?];
        while *self.peek() == Token::Arrow {
            self.advance();
            nodes.push(self.parse_chain_node()?);
        }
        Ok(FlowEntryChain {
            nodes,
            span: self.span_from(start),
        })
    }

    fn parse_chain_node(&mut self) -> PResult<ChainNode> {
        let target = self.take_ref(kinds::CHAIN_NODES)?;
        let label = self.take_label();
        Ok(ChainNode { target, label })
    }

    /// Optional quoted label directly after a node.
    fn take_label(&mut self) -> Option<String> {
        match self.peek().clone() {
            Token::Str(s) => {
                self.advance();
                Some(s)
            }
            _ => None,
        }
    }

    pub(super) fn parse_when(&mut self) -> PResult<FlowWhenBlock> {
        let start = self.expect_word("when")?;
        let mut triggers = vec![self.take_ref(kinds::MESSAGES)?];
        while self.is_word("and") {
            self.advance();
            triggers.push(self.take_ref(kinds::MESSAGES)?);
        }
        let join = if triggers.len() > 1 {
            TriggerJoin::All
        } else {
            TriggerJoin::Single
        };

        let when_column = self.column(start);
        let mut actions = Vec::new();
        while self.at_action_start() {
            let dedented = self.at_line_start() && self.column(self.cur_span()) <= when_column;
            if !actions.is_empty() && dedented {
                break;
            }
            actions.push(self.parse_action()?);
        }
        if actions.is_empty() {
            return Err(self.err(format!(
                "when-block needs at least one action, got {}",
                self.peek().describe()
            )));
        }
        Ok(FlowWhenBlock {
            triggers,
            join,
            actions,
            span: self.span_from(start),
        })
    }

    fn at_action_start(&self) -> bool {
        match self.peek() {
            Token::Word(w) => !FLOW_STATEMENT_WORDS.contains(&w.as_str()),
            _ => false,
        }
    }

    fn parse_action(&mut self) -> PResult<FlowAction> {
        let start = self.cur_span();
        let participant = self.take_ref(kinds::PARTICIPANTS)?;
        let label = self.take_label();
        let mut outputs = Vec::new();
        while *self.peek() == Token::Arrow {
            let arrow = self.advance().span;
            let label = if matches!(self.peek(), Token::Str(_)) && *self.peek_at(1) == Token::Colon
            {
                let label = self.take_str()?;
                self.advance();
                Some(label)
            } else {
                None
            };
            let target = self.take_ref(kinds::MESSAGES)?;
            outputs.push(FlowOutput {
                label,
                target,
                span: self.span_from(arrow),
            });
        }
        Ok(FlowAction {
            participant,
            label,
            outputs,
            span: self.span_from(start),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{Statement, TriggerJoin};
    use crate::parser::parse;

    fn flow_body(src: &str) -> Vec<Statement> {
        let out = parse(src, "flow.ec");
        assert!(!out.has_errors(), "{:?}", out.diagnostics);
        out.program.definitions[0].body.clone()
    }

    #[test]
    fn entry_chain_keeps_nodes_and_labels_in_order() {
        let stmts = flow_body(
            r#"flow Checkout {
  version 1.0.0
  Customer "places an order" -> PlaceOrder -> OrderService "creates the order" -> OrderCreated
}"#,
        );
        let Statement::EntryChain(chain) = &stmts[1] else {
            panic!("expected entry chain, got {:?}", stmts[1]);
        };
        let names: Vec<_> = chain.nodes.iter().map(|n| n.target.name.as_str()).collect();
        assert_eq!(
            names,
            ["Customer", "PlaceOrder", "OrderService", "OrderCreated"]
        );
        assert_eq!(chain.nodes[0].label.as_deref(), Some("places an order"));
        assert_eq!(chain.nodes[2].label.as_deref(), Some("creates the order"));
        assert!(chain.nodes[1].label.is_none());
    }

    #[test]
    fn when_block_with_branches_and_terminal_action() {
        let stmts = flow_body(
            r#"flow Payment {
  version 1.0.0
  when PaymentAuthorized and StockReserved
    OrderService "confirms"
      -> "success": OrderConfirmed
      -> "failure": OrderRejected
    Notifier
  when OrderRejected
    Support -> RefundIssued
}"#,
        );
        let Statement::When(first) = &stmts[1] else {
            panic!("expected when-block");
        };
        assert_eq!(first.join, TriggerJoin::All);
        let triggers: Vec<_> = first.triggers.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(triggers, ["PaymentAuthorized", "StockReserved"]);
        assert_eq!(first.actions.len(), 2);
        let outputs = &first.actions[0].outputs;
        assert_eq!(outputs[0].label.as_deref(), Some("success"));
        assert_eq!(outputs[1].target.name, "OrderRejected");
        assert!(first.actions[1].outputs.is_empty());

        let Statement::When(second) = &stmts[2] else {
            panic!("expected second when-block");
        };
        assert_eq!(second.join, TriggerJoin::Single);
        assert!(second.actions[0].outputs[0].label.is_none());
    }

    #[test]
    fn dedented_line_after_when_block_is_an_entry_chain() {
        let stmts = flow_body(
            "flow F {\n  version 1.0.0\n  when A\n    Svc -> B\n  Customer -> X -> Y\n}",
        );
        let Statement::When(block) = &stmts[1] else {
            panic!("expected when-block, got {:?}", stmts[1]);
        };
        assert_eq!(block.actions.len(), 1);
        let Statement::EntryChain(chain) = &stmts[2] else {
            panic!("expected entry chain, got {:?}", stmts[2]);
        };
        assert_eq!(chain.nodes.len(), 3);
    }

    #[test]
    fn unindented_first_action_still_belongs_to_its_when() {
        let stmts = flow_body("flow F {\nwhen A\nNotifier\n}");
        let Statement::When(block) = &stmts[0] else {
            panic!("expected when-block");
        };
        assert_eq!(block.actions[0].participant.name, "Notifier");
    }

    #[test]
    fn when_without_actions_is_an_error() {
        let out = parse("flow F {\n  when A\n}", "flow.ec");
        assert!(out.has_errors());
    }

    #[test]
    fn chain_with_versioned_nodes() {
        let stmts = flow_body("flow F {\n  Customer -> PlaceOrder@2.0.0 -> Orders\n}");
        let Statement::EntryChain(chain) = &stmts[0] else {
            panic!("expected entry chain");
        };
        assert_eq!(
            chain.nodes[1].target.version.as_ref().map(|v| v.as_str()),
            Some("2.0.0")
        );
    }
}
