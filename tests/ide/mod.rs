mod tests_inheritors;
mod tests_positions;
mod tests_scopes;
mod tests_smart_casts;
mod tests_types;
