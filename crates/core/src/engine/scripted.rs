//! A shell-scripted UCI responder for driving `StockfishEngine` in tests

use std::process::Command;

use super::stockfish::StockfishEngine;

/// Starts an engine that answers `uci` and `isready`, and replies to the
/// n-th `go` with the n-th entry of `searches`. Each entry should end with
/// a `bestmove` line. Searches past the script answer `bestmove (none)`.
pub(crate) fn scripted_engine(searches: &[&[&str]]) -> StockfishEngine {
    let mut script = String::from(
        "n=0\n\
         while read -r cmd rest; do\n\
         case \"$cmd\" in\n\
         uci) echo 'id name Scripted'; echo uciok ;;\n\
         isready) echo readyok ;;\n\
         quit) exit 0 ;;\n\
         go)\n\
         n=$((n+1))\n\
         case $n in\n",
    );
    for (idx, lines) in searches.iter().enumerate() {
        script.push_str(&format!("{})\n", idx + 1));
        for line in lines.iter() {
            script.push_str(&format!("echo '{}'\n", line));
        }
        script.push_str(";;\n");
    }
    script.push_str("*) echo 'bestmove (none)' ;;\nesac\n;;\nesac\ndone\n");

    let mut command = Command::new("sh");
    command.arg("-c").arg(script);
    StockfishEngine::from_command(command).expect("scripted engine should start")
}
