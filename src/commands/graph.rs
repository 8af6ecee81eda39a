use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};

use devfile_lint::graph::CommandGraph;
use devfile_lint::loader::DevfileLoader;

pub fn graph_command(path: &Path, output_path: Option<&Path>, order: bool) -> Result<()> {
    let loader = DevfileLoader::new(path)?;
    let loaded = loader.load_validated()?;

    if loaded.devfile.commands.is_empty() {
        println!("No commands found.");
        return Ok(());
    }

    let graph = CommandGraph::new(&loaded.devfile.commands)?;

    if order {
        for (position, id) in graph.topological_sort()?.iter().enumerate() {
            println!("{:>3}. {id}", position + 1);
        }
        return Ok(());
    }

    let dot_output = graph.to_dot();

    match output_path {
        Some(out) if out.extension().is_some_and(|ext| ext == "dot") => {
            std::fs::write(out, &dot_output)
                .with_context(|| format!("Failed to write {}", out.display()))?;
            println!("Graph saved to: {}", out.display());
        }
        Some(out) => render_dot(&dot_output, out)?,
        None => print!("{dot_output}"),
    }

    Ok(())
}

fn render_dot(dot_content: &str, output_path: &Path) -> Result<()> {
    let format = output_path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("png");

    let mut dot = Command::new("dot");
    dot.arg(format!("-T{format}")).arg("-o").arg(output_path);

    let status = pipe_into(dot, dot_content.as_bytes())?;
    if !status.success() {
        anyhow::bail!("Failed to render graph with Graphviz");
    }

    println!("Graph saved to: {}", output_path.display());
    Ok(())
}

/// Feed `input` to the command's stdin and wait for it to exit
fn pipe_into(mut command: Command, input: &[u8]) -> Result<ExitStatus> {
    let mut child = command.stdin(Stdio::piped()).spawn().with_context(|| {
        format!(
            "Failed to run `{}`; Graphviz is required to render images, write a .dot file instead",
            command.get_program().to_string_lossy()
        )
    })?;

    let written = match child.stdin.take() {
        Some(mut stdin) => stdin.write_all(input),
        None => Ok(()),
    };

    // Reap the child even when the write failed
    let status = child.wait()?;
    written.context("Failed to send the graph to Graphviz")?;
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipe_into_returns_child_status() {
        let mut cat = Command::new("cat");
        cat.stdout(Stdio::null());
        let status = pipe_into(cat, b"digraph {}").unwrap();
        assert!(status.success());
    }

    #[test]
    fn pipe_into_reports_write_failure_after_child_exits() {
        // Larger than a pipe buffer, so the write fails once `true` exits
        let input = vec![b'x'; 4 * 1024 * 1024];
        let err = pipe_into(Command::new("true"), &input).unwrap_err();
        assert_eq!(err.to_string(), "Failed to send the graph to Graphviz");
    }
}
