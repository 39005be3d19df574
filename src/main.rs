fn main() {
    std::process::exit(jira_burndown_lib::run())
}
