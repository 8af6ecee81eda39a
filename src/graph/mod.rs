mod command_graph;

pub use command_graph::{CommandGraph, CommandNode};
