fn main() {
    j2cpp::projects::start_cli();
}
