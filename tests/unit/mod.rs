mod translation_properties;
