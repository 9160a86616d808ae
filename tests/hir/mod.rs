mod tests_pointers;
mod tests_session_validity;
mod tests_settings;
mod tests_symbols;
