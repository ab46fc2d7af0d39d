//! Shell integration scripts for `git-wt init`.
//!
//! Each script defines a `gwt` function that runs the binary in
//! `--internal` mode, intercepts the cd directive on stdout, and changes
//! directory in the calling shell. Install with e.g.
//! `eval "$(git-wt init bash)"` in the shell's rc file.

use crate::output::CD_DIRECTIVE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
}

impl std::fmt::Display for Shell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Shell::Bash => write!(f, "bash"),
            Shell::Zsh => write!(f, "zsh"),
            Shell::Fish => write!(f, "fish"),
        }
    }
}

/// Wrapper function source for `shell`, ready to be `eval`-ed.
pub fn init_script(shell: Shell) -> String {
    match shell {
        // The bash and zsh wrappers are identical: both shells accept the
        // same function syntax and `${var#prefix}` stripping.
        Shell::Bash | Shell::Zsh => format!(
            r#"gwt() {{
    local output status
    output="$(command git-wt --internal "$@")"
    status=$?
    if [ $status -ne 0 ]; then
        return $status
    fi
    case "$output" in
        {CD_DIRECTIVE}*)
            cd "${{output#{CD_DIRECTIVE}}}" || return $?
            ;;
        ?*)
            printf '%s\n' "$output"
            ;;
    esac
}}
"#
        ),
        Shell::Fish => format!(
            r#"function gwt
    set -l output (command git-wt --internal $argv)
    set -l code $status
    if test $code -ne 0
        return $code
    end
    for line in $output
        if string match -q '{CD_DIRECTIVE}*' -- $line
            cd (string replace '{CD_DIRECTIVE}' '' -- $line); or return $status
        else
            printf '%s\n' $line
        end
    end
end
"#
        ),
    }
}
