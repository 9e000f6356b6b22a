pub mod calculation_result;
pub mod city_rule;
pub mod salary;
pub mod upload;
