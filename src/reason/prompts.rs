// src/reason/prompts.rs

//! Prompt builders for the external collaborator.
//!
//! Each builder renders the full context for one judgment into a single
//! prompt string; the collaborator replies on stdout. Replies that must
//! carry structure are requested as fenced JSON and parsed by
//! [`super::external`].

use crate::graph::grounding::PlanGrounding;
use crate::reason::{DiagnoseRequest, DraftRequest, EntitySet, HarnessRequest, ReviewRequest};

pub fn plan_prompt(spec: &str) -> String {
    format!(
        "You are an RTL architect. Read the specification below and break the \
         implementation into a short ordered list of steps.\n\n\
         [Specification]\n{spec}\n\n\
         Reply with a JSON array inside a ```json fence, each element an object \
         with \"name\" and \"description\" fields."
    )
}

pub fn entity_prompt(spec: &str, plan_json: &str) -> String {
    format!(
        "Extract the entities needed to implement this design.\n\n\
         [Specification]\n{spec}\n\n\
         [Plan]\n{plan_json}\n\n\
         Reply with a JSON object inside a ```json fence with keys \"plans\", \
         \"signals\", \"fsm_states\" and \"examples\", each a list of objects \
         with \"name\" and \"description\". Signal names come from the port \
         list; FSM states only if the design is stateful; examples are \
         input/output vectors quoted from the specification."
    )
}

pub fn relationship_prompt(spec: &str, entities: &EntitySet) -> String {
    let names: Vec<&str> = entities
        .plans
        .iter()
        .chain(&entities.signals)
        .chain(&entities.fsm_states)
        .chain(&entities.examples)
        .map(|e| e.name.as_str())
        .collect();
    format!(
        "Relate the entities extracted from this design to each other.\n\n\
         [Specification]\n{spec}\n\n\
         [Entities]\n{}\n\n\
         Reply with a JSON object inside a ```json fence with one key \
         \"relationships\": a list of objects with \"source\", \"target\" and \
         \"relationship\" (one of \"IMPLEMENTS\", \"STATE_TRANSITION\", \
         \"EXAMPLES\"). Use only entity names from the list above.",
        names.join("\n")
    )
}

pub fn task_prompt(spec: &str, groundings: &[PlanGrounding]) -> String {
    let mut context = String::new();
    for g in groundings {
        context.push_str(&format!("[Plan] {}\n", g.plan));
        for s in &g.signals {
            context.push_str(&format!("  signal  {s}\n"));
        }
        for s in &g.fsm_states {
            context.push_str(&format!("  state   {s}\n"));
        }
        for s in &g.examples {
            context.push_str(&format!("  example {s}\n"));
        }
    }
    format!(
        "Turn the grounded plan below into the final ordered task list for \
         writing the Verilog module.\n\n\
         [Specification]\n{spec}\n\n\
         [Grounded plan]\n{context}\n\
         Reply with a JSON array of task strings inside a ```json fence, in \
         implementation order."
    )
}

pub fn draft_prompt(request: &DraftRequest) -> String {
    let mut prompt = format!(
        "Write Verilog-2012 for the next task. Extend the accumulated code; do \
         not restate completed work. The module must end with `endmodule`.\n\n\
         [Task]\n{}\n",
        request.task
    );
    if let Some(iface) = &request.interface {
        prompt.push_str(&format!("\n[Module interface]\n{iface}\n"));
    }
    if !request.current_code.is_empty() {
        prompt.push_str(&format!(
            "\n[Accumulated code]\n```verilog\n{}\n```\n",
            request.current_code
        ));
    }
    if let Some(feedback) = &request.feedback {
        prompt.push_str(&format!("\n[Previous attempt was rejected]\n{feedback}\n"));
    }
    prompt.push_str("\nReply with the complete module inside a ```verilog fence.");
    prompt
}

pub fn review_prompt(request: &ReviewRequest) -> String {
    format!(
        "Review the Verilog below against its task. It already compiles; judge \
         only whether it implements the task.\n\n\
         [Task]\n{}\n\n\
         [Code]\n```verilog\n{}\n```\n\n\
         Reply `APPROVE` on the first line if correct, otherwise describe what \
         must change.",
        request.task, request.code
    )
}

pub fn harness_prompt(request: &HarnessRequest) -> String {
    let mut prompt = format!(
        "Write a self-checking Verilog testbench named `tb` for the design \
         described below. Drive the design and the golden reference with the \
         same stimulus, count mismatches, and print exactly one summary line \
         `Mismatches: <n> in <total> samples` at the end of simulation. Dump \
         all signals to `wave.vcd`. The testbench must end with `endmodule`.\n\n\
         [Specification]\n{}\n",
        request.spec
    );
    if let Some(iface) = &request.interface {
        prompt.push_str(&format!("\n[Design interface]\n{iface}\n"));
    }
    if let Some(feedback) = &request.feedback {
        prompt.push_str(&format!("\n[Previous attempt was rejected]\n{feedback}\n"));
    }
    prompt.push_str("\nReply with the complete testbench inside a ```verilog fence.");
    prompt
}

pub fn harness_review_prompt(harness: &str, spec: &str) -> String {
    format!(
        "Review the testbench below against the specification. Check stimulus \
         coverage, the mismatch counter, and the summary line format \
         `Mismatches: <n> in <total> samples`.\n\n\
         [Specification]\n{spec}\n\n\
         [Testbench]\n```verilog\n{harness}\n```\n\n\
         Reply `APPROVE` on the first line if sound, otherwise describe what \
         must change."
    )
}

pub fn diagnose_prompt(request: &DiagnoseRequest) -> String {
    let mut prompt = format!(
        "The design below fails its testbench. Decide the next debugging move.\n\n\
         [Design]\n```verilog\n{}\n```\n\n\
         [Testbench]\n```verilog\n{}\n```\n\n\
         [Simulation report]\n{}\n",
        request.code, request.harness, request.report
    );
    if let Some(trace) = &request.trace {
        prompt.push_str(&format!("\n[Waveform window]\n{trace}\n"));
    }
    prompt.push_str(
        "\nReply with a JSON object inside a ```json fence. Either\n\
         {\"action\": \"revise\", \"code\": \"<complete revised module>\"}\n\
         or\n\
         {\"action\": \"waveform\", \"signals\": [\"tb.clk\", ...], \
         \"start_time\": <ns>, \"end_time\": <ns>}",
    );
    prompt
}
