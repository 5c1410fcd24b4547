fn main() {
    ferrite::board::init();
    ferrite::uci::run();
}
