mod repair_properties;
